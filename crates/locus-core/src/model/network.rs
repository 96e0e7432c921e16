use locus_api::IpLocation;

use crate::network_info;

/// Network-ownership facts for the requester's address.
///
/// Always derived from the IP lookup, whichever path produced the location.
/// Every field degrades to empty / `false` when the lookup fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInfo {
    pub isp_name: String,
    pub asn: String,
    pub is_proxy: bool,
}

impl NetworkInfo {
    pub fn from_lookup(loc: &IpLocation) -> Self {
        Self {
            is_proxy: loc.is_proxy,
            ..network_info::parse(&loc.asn, &loc.as_name)
        }
    }
}
