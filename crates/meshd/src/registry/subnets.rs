//! Subnet ownership table.

use mesh_config::SubnetSpec;

/// A subnet and the node that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedSubnet {
    /// Owning node.
    pub owner: String,
    /// Address range.
    pub subnet: SubnetSpec,
}

/// Every known subnet.
#[derive(Debug, Default)]
pub struct SubnetRegistry {
    subnets: Vec<OwnedSubnet>,
}

impl SubnetRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `subnet` as owned by `owner`; duplicates are ignored.
    pub fn add(&mut self, owner: &str, subnet: SubnetSpec) {
        let entry = OwnedSubnet {
            owner: owner.to_owned(),
            subnet,
        };
        if !self.subnets.contains(&entry) {
            self.subnets.push(entry);
        }
    }

    /// Subnets owned by `owner`.
    pub fn owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a SubnetSpec> + 'a {
        self.subnets
            .iter()
            .filter(move |entry| entry.owner == owner)
            .map(|entry| &entry.subnet)
    }

    /// Number of subnets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }
}
