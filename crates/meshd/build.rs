//! Build script: render the meshd(8) manual page for packagers.

use std::{env, fs, io, path::Path, path::PathBuf};
use time::{OffsetDateTime, format_description::well_known::Iso8601};

const FALLBACK_DATE: &str = "1970-01-01";

fn manual_date() -> String {
    let Ok(raw) = env::var("SOURCE_DATE_EPOCH") else {
        return FALLBACK_DATE.into();
    };
    let Some(date) = raw
        .parse::<i64>()
        .ok()
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .and_then(|moment| moment.format(&Iso8601::DATE).ok())
    else {
        println!(
            "cargo:warning=Invalid SOURCE_DATE_EPOCH '{raw}'; falling back to {FALLBACK_DATE}"
        );
        return FALLBACK_DATE.into();
    };
    date
}

/// `target/generated-man/<target>/<profile>`, derived from OUT_DIR, which
/// sits at `target/<profile>/build/<crate>-<hash>/out`.
fn man_dir() -> PathBuf {
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown-target".into());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".into());
    let base = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .and_then(|out| out.ancestors().nth(4).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("target"));
    base.join(format!("generated-man/{target}/{profile}"))
}

fn write_man_page(data: &[u8], dir: &Path, page_name: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let destination = dir.join(page_name);
    let staging = dir.join(format!("{page_name}.tmp"));
    fs::write(&staging, data)?;
    fs::rename(&staging, &destination)?;
    Ok(destination)
}

fn render(binary: &str, version: &str, date: &str) -> String {
    let title = binary.to_uppercase();
    format!(
        ".TH \"{title}\" \"8\" \"{date}\" \"{binary} {version}\" \"System Manager's Manual\"\n\
.SH NAME\n\
{binary} \\- mesh VPN daemon\n\
.SH SYNOPSIS\n\
.B {binary}\n\
[\\fB\\-c\\fR \\fIDIR\\fR] [\\fB\\-n\\fR \\fINET\\fR] [\\fB\\-D\\fR] [\\fB\\-\\-runtime\\-dir\\fR \\fIDIR\\fR]\n\
.SH DESCRIPTION\n\
Brings up one mesh network: reads its configuration, opens the tunnel device,\n\
listens for peers and runs the up and down hook scripts.\n\
.SH FILES\n\
.TP\n\
.I <confbase>/meshd.conf\n\
Global settings.\n\
.TP\n\
.I <confbase>/hosts/<name>\n\
Per-node settings and public key.\n\
.TP\n\
.I <confbase>/rsa_key.priv\n\
Default private key; must not be group or world writable.\n\
.TP\n\
.I <confbase>/mesh-up, <confbase>/mesh-down\n\
Hook scripts, run with NETNAME, DEVICE, INTERFACE and NAME set.\n\
.SH SIGNALS\n\
SIGTERM, SIGINT, SIGQUIT and SIGHUP stop the network and exit.\n"
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for variable in ["CARGO_PKG_VERSION", "SOURCE_DATE_EPOCH", "TARGET", "PROFILE"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let binary = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| "meshd".into());
    let version = env::var("CARGO_PKG_VERSION")
        .map_err(|_| "CARGO_PKG_VERSION must be set by Cargo to render the manual page")?;
    let page = render(&binary, &version, &manual_date());
    let page_name = format!("{binary}.8");

    write_man_page(page.as_bytes(), &man_dir(), &page_name)?;
    if let Some(out_dir) = env::var_os("OUT_DIR") {
        let out_dir = PathBuf::from(out_dir);
        if let Err(error) = write_man_page(page.as_bytes(), &out_dir, &page_name) {
            println!(
                "cargo:warning=Failed to stage manual page in OUT_DIR ({}): {error}",
                out_dir.display()
            );
        }
    }
    Ok(())
}
