//! Traffic policy: which destinations are redirected through the proxy.
//!
//! # Precedence
//! ```text
//! policy disabled (invalid block list)  → deny
//! allow list configured                 → member of allow list
//! block list configured and member      → deny
//! managed hint                          → allow
//! otherwise                             → allow iff classified External
//! ```
//!
//! # Design Decisions
//! - Invalid allow-list entries are dropped; an invalid block list fails closed
//! - A configured allow list silences the block list entirely
//! - Membership is exact string comparison, as is the classification cache key
//! - A managed proxy requires an allow list; without one the policy fails closed

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::TrafficConfig;
use crate::net::classifier::AddressClassifier;
use crate::net::resolver::Resolver;
use crate::security::lists::is_valid_entry;

/// Allow/deny decisions for outbound destinations.
#[derive(Debug)]
pub struct TrafficPolicy {
    allow_list: Option<HashSet<String>>,
    block_list: Option<HashSet<String>>,
    enabled: bool,
    managed: bool,
    classifier: AddressClassifier,
}

impl TrafficPolicy {
    /// Build a policy that resolves names through the OS resolver.
    pub fn new(config: &TrafficConfig) -> Self {
        Self::with_classifier(config, AddressClassifier::default())
    }

    pub fn with_resolver(config: &TrafficConfig, resolver: Arc<dyn Resolver>) -> Self {
        Self::with_classifier(config, AddressClassifier::new(resolver))
    }

    pub fn with_classifier(config: &TrafficConfig, classifier: AddressClassifier) -> Self {
        let allow_list = config.allow_list.as_ref().map(|entries| validate_allow(entries));
        let (block_list, enabled) = match &config.block_list {
            None => (None, true),
            Some(_) if allow_list.is_some() => {
                tracing::warn!("Allow list is configured, ignoring the block list");
                (None, true)
            }
            Some(entries) => match validate_block(entries) {
                Some(block_list) => (Some(block_list), true),
                None => {
                    tracing::warn!(
                        "Traffic policy disabled to avoid passing wrong traffic through the proxy"
                    );
                    (None, false)
                }
            },
        };

        tracing::debug!(
            enabled,
            allow_list = allow_list.as_ref().map(HashSet::len),
            block_list = block_list.as_ref().map(HashSet::len),
            "Traffic policy loaded"
        );

        Self {
            allow_list,
            block_list,
            enabled,
            managed: false,
            classifier,
        }
    }

    /// Apply the proxy's managed mode, as reported by the handshake.
    ///
    /// A managed proxy only accepts traffic the allow list names, so a policy
    /// without one is disabled.
    pub fn with_managed(mut self, managed: bool) -> Self {
        self.managed = managed;
        if managed && self.allow_list.is_none() && self.enabled {
            tracing::warn!(
                "Proxy is managed but no allow list is configured, disabling redirection"
            );
            self.enabled = false;
        }
        self
    }

    /// Should a call to `host_or_ip` be redirected through the proxy?
    ///
    /// `managed_hint` marks the destination as known-safe regardless of its
    /// address; it does not bypass the allow list or the block list.
    pub fn is_allowed(&self, host_or_ip: &str, managed_hint: bool) -> bool {
        if !self.enabled {
            return false;
        }

        if let Some(allow_list) = &self.allow_list {
            return allow_list.contains(host_or_ip);
        }

        if self
            .block_list
            .as_ref()
            .is_some_and(|block_list| block_list.contains(host_or_ip))
        {
            return false;
        }

        managed_hint || self.classifier.is_external(host_or_ip)
    }

    /// False when the block list was rejected; every call is denied.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub fn allow_list(&self) -> Option<&HashSet<String>> {
        self.allow_list.as_ref()
    }

    pub fn block_list(&self) -> Option<&HashSet<String>> {
        self.block_list.as_ref()
    }

    pub fn classifier(&self) -> &AddressClassifier {
        &self.classifier
    }
}

fn validate_allow(entries: &[String]) -> HashSet<String> {
    entries
        .iter()
        .filter(|entry| {
            let valid = is_valid_entry(entry);
            if !valid {
                tracing::warn!(entry = %entry, "Unsupported value removed from the allow list");
            }
            valid
        })
        .cloned()
        .collect()
}

/// `None` if any entry is invalid.
fn validate_block(entries: &[String]) -> Option<HashSet<String>> {
    let mut valid = true;
    for entry in entries.iter().filter(|entry| !is_valid_entry(entry)) {
        tracing::warn!(entry = %entry, "Error while parsing block list entry");
        valid = false;
    }
    valid.then(|| entries.iter().cloned().collect())
}
