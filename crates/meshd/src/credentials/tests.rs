//! Resolution-order tests for key loading.

use std::io;

use mesh_config::{ConfigTree, NodeConfig};
use rstest::rstest;

use super::*;
use crate::tests::support::keys::{
    exponent_hex, modulus_hex, private_pkcs1_pem, public_pkcs1_pem, public_spki_pem,
    test_private_key,
};
use crate::tests::support::TestConfDir;

fn expected_public_key() -> PublicKey {
    PublicKey::new(test_private_key().to_public_key())
}

#[test]
fn inline_private_key_needs_no_file() {
    let dir = TestConfDir::new();
    let config = NodeConfig::new(ConfigTree::new().with("PrivateKey", exponent_hex()));
    let mut reader = MockKeyReader::new();
    reader.expect_read_to_string().times(0);

    let key = load_private_key(&config, dir.paths(), &reader).expect("inline key");
    assert!(matches!(key, PrivateKey::Exponent(_)));
}

#[test]
fn private_key_defaults_to_confbase_file() {
    let dir = TestConfDir::new();
    dir.write_key("rsa_key.priv", &private_pkcs1_pem(), 0o600);
    let config = NodeConfig::default();

    let key = load_private_key(&config, dir.paths(), &FsKeyReader).expect("file key");
    assert!(matches!(key, PrivateKey::Full(_)));
}

#[cfg(unix)]
#[test]
fn unsafe_private_key_file_is_never_opened() {
    let dir = TestConfDir::new();
    let path = dir.write_key("loose.priv", &private_pkcs1_pem(), 0o666);
    let config = NodeConfig::new(ConfigTree::new().with("PrivateKeyFile", path.as_str()));
    let mut reader = MockKeyReader::new();
    reader.expect_read_to_string().times(0);

    let error = load_private_key(&config, dir.paths(), &reader).expect_err("file is unsafe");
    assert!(matches!(
        error,
        CredentialError::UnsafePath(UnsafePathError {
            reason: UnsafeReason::Writable { .. },
            ..
        })
    ));
}

#[test]
fn missing_private_key_is_a_read_error() {
    let dir = TestConfDir::new();
    let error = load_private_key(&NodeConfig::default(), dir.paths(), &FsKeyReader)
        .expect_err("no key on disk");
    assert!(matches!(error, CredentialError::Read { ref source, .. } if source.kind() == io::ErrorKind::NotFound));
}

#[test]
fn garbage_private_key_is_malformed() {
    let dir = TestConfDir::new();
    dir.write_key("rsa_key.priv", "not a key\n", 0o600);
    let error = load_private_key(&NodeConfig::default(), dir.paths(), &FsKeyReader)
        .expect_err("garbage key");
    assert!(matches!(error, CredentialError::MalformedPrivateKey { .. }));
}

#[derive(Debug, Clone, Copy)]
enum PublicSource {
    Inline,
    Pkcs1File,
    SpkiFile,
    Pkcs1HostFile,
    SpkiHostFile,
}

#[rstest]
#[case(PublicSource::Inline)]
#[case(PublicSource::Pkcs1File)]
#[case(PublicSource::SpkiFile)]
#[case(PublicSource::Pkcs1HostFile)]
#[case(PublicSource::SpkiHostFile)]
fn every_source_yields_the_same_key(#[case] source: PublicSource) {
    let dir = TestConfDir::new();
    let host = match source {
        PublicSource::Inline => ConfigTree::new().with("PublicKey", modulus_hex()),
        PublicSource::Pkcs1File => {
            let path = dir.write_key("nodeB.pub", &public_pkcs1_pem(), 0o644);
            ConfigTree::new().with("PublicKeyFile", path.as_str())
        }
        PublicSource::SpkiFile => {
            let path = dir.write_key("nodeB.pub", &public_spki_pem(), 0o644);
            ConfigTree::new().with("PublicKeyFile", path.as_str())
        }
        PublicSource::Pkcs1HostFile => {
            dir.write_key("hosts/nodeB", &format!("Port = 655\n{}", public_pkcs1_pem()), 0o644);
            ConfigTree::new()
        }
        PublicSource::SpkiHostFile => {
            dir.write_key("hosts/nodeB", &format!("Port = 655\n{}", public_spki_pem()), 0o644);
            ConfigTree::new()
        }
    };
    let config = NodeConfig::default().with_host(host);

    let key = load_public_key(&config, "nodeB", dir.paths(), &FsKeyReader).expect("public key");
    assert_eq!(key, expected_public_key());
}

#[test]
fn second_encoding_rereads_the_file() {
    let dir = TestConfDir::new();
    let path = dir.write_key("hosts/nodeB", &public_spki_pem(), 0o644);
    let mut reader = MockKeyReader::new();
    reader
        .expect_read_to_string()
        .withf(move |candidate| candidate == path.as_path())
        .times(2)
        .returning(|_| Ok(public_spki_pem()));

    let key = load_public_key(&NodeConfig::default(), "nodeB", dir.paths(), &reader)
        .expect("spki key");
    assert_eq!(key, expected_public_key());
}

#[test]
fn exhausted_sources_name_the_peer() {
    let dir = TestConfDir::new();
    let error = load_public_key(&NodeConfig::default(), "nodeC", dir.paths(), &FsKeyReader)
        .expect_err("no key anywhere");
    assert!(matches!(error, CredentialError::MissingPublicKey { ref name } if name == "nodeC"));
    assert!(error.to_string().contains("nodeC"));
}

#[test]
fn host_file_without_key_is_exhausted() {
    let dir = TestConfDir::new();
    dir.write_key("hosts/nodeC", "Port = 655\n", 0o644);
    let error = load_public_key(&NodeConfig::default(), "nodeC", dir.paths(), &FsKeyReader)
        .expect_err("host file carries no key");
    assert!(matches!(error, CredentialError::MissingPublicKey { .. }));
}

#[test]
fn undecodable_public_key_file_is_fatal() {
    let dir = TestConfDir::new();
    let path = dir.write_key("nodeB.pub", "garbage\n", 0o644);
    dir.write_key("hosts/nodeB", &public_pkcs1_pem(), 0o644);
    let config = NodeConfig::default()
        .with_host(ConfigTree::new().with("PublicKeyFile", path.as_str()));

    let error = load_public_key(&config, "nodeB", dir.paths(), &FsKeyReader)
        .expect_err("configured file is unusable");
    assert!(matches!(error, CredentialError::MalformedPublicKey { .. }));
}
