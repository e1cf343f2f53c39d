//! Domain profiles.
//!
//! The pipeline is generic; a profile supplies everything that differs
//! between the governance and network variants: the item catalog, the
//! decision keyword sets, stage role names, the simulated action wording,
//! the feed route and the oracle prompt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which built-in profile to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// DAO governance proposals
    #[default]
    Governance,

    /// Network traffic advisories
    Network,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Governance => "governance",
            ProfileKind::Network => "network",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "governance" => Ok(ProfileKind::Governance),
            "network" => Ok(ProfileKind::Network),
            other => Err(format!(
                "Unknown profile '{}'. Use 'governance' or 'network'",
                other
            )),
        }
    }
}

/// A catalog entry the generator picks from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub description: String,
}

impl CatalogEntry {
    fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// Positive and negative keyword sets, stored lower-cased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSets {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl KeywordSets {
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: lowercase_all(positive),
            negative: lowercase_all(negative),
        }
    }

    /// The governance vocabulary
    pub fn governance() -> Self {
        Self::new(
            [
                "benefit", "positive", "improve", "increase", "enhance", "good", "valuable",
            ],
            [
                "risk",
                "negative",
                "harm",
                "decrease",
                "reduce",
                "bad",
                "concern",
                "vulnerability",
            ],
        )
    }

    /// Congestion vocabulary; "positive" here argues for applying an adjustment
    pub fn network() -> Self {
        Self::new(
            [
                "congested",
                "congestion",
                "high traffic",
                "overload",
                "saturat",
                "latency",
            ],
            [
                "no adjustment",
                "not needed",
                "stable",
                "normal",
                "healthy",
                "within capacity",
            ],
        )
    }

    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    pub fn negative(&self) -> &[String] {
        &self.negative
    }
}

fn lowercase_all<I>(words: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().to_lowercase())
        .collect()
}

/// Role names used as log line prefixes, one per stage
#[derive(Debug, Clone)]
pub struct StageRoles {
    pub monitor: String,
    pub analyzer: String,
    pub strategist: String,
    pub actor: String,
}

/// Everything that parameterizes one pipeline variant
#[derive(Debug, Clone)]
pub struct DomainProfile {
    pub kind: ProfileKind,

    /// Singular noun for an item ("proposal", "advisory")
    pub noun: String,

    /// Plural noun for feed messages ("proposals", "advisories")
    pub plural: String,

    /// Feed endpoint path, e.g. "/proposal"
    pub route: String,

    /// Static catalog the generator samples from
    pub catalog: Vec<CatalogEntry>,

    pub keywords: KeywordSets,

    pub roles: StageRoles,

    /// Description of the simulated side effect; `{title}` is substituted
    pub action_template: String,

    /// Oracle prompt; `{title}` and `{description}` are substituted
    pub prompt_template: String,
}

impl DomainProfile {
    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Governance => Self::governance(),
            ProfileKind::Network => Self::network(),
        }
    }

    pub fn governance() -> Self {
        Self {
            kind: ProfileKind::Governance,
            noun: "proposal".to_string(),
            plural: "proposals".to_string(),
            route: "/proposal".to_string(),
            catalog: vec![
                CatalogEntry::new(
                    "Proposal to Increase Staking Rewards by 10%",
                    "This proposal suggests increasing staking rewards to incentivize participation and secure the network.",
                ),
                CatalogEntry::new(
                    "Proposal to Partner with Project XYZ",
                    "This proposal recommends a strategic partnership with Project XYZ to expand our ecosystem.",
                ),
                CatalogEntry::new(
                    "Proposal to Launch a New Product Feature",
                    "This proposal suggests developing a new feature to boost user engagement and competitive advantage.",
                ),
            ],
            keywords: KeywordSets::governance(),
            roles: StageRoles {
                monitor: "Proposal Monitor".to_string(),
                analyzer: "Proposal Analyzer".to_string(),
                strategist: "Voting Strategy Agent".to_string(),
                actor: "Voting Agent".to_string(),
            },
            action_template: "simulated vote cast for proposal '{title}'".to_string(),
            prompt_template: GOVERNANCE_PROMPT.to_string(),
        }
    }

    pub fn network() -> Self {
        Self {
            kind: ProfileKind::Network,
            noun: "advisory".to_string(),
            plural: "advisories".to_string(),
            route: "/advisory".to_string(),
            catalog: vec![
                CatalogEntry::new(
                    "VLAN_1 Traffic Advisory",
                    "VLAN_1 is carrying 180 Mbps against a 100 Mbps budget; the uplink is congested and latency is climbing.",
                ),
                CatalogEntry::new(
                    "VLAN_3 Utilization Report",
                    "VLAN_3 traffic is stable at 40 Mbps and well within capacity.",
                ),
                CatalogEntry::new(
                    "VLAN_2 Burst Notice",
                    "VLAN_2 saw a short burst of high traffic that returned to normal levels.",
                ),
            ],
            keywords: KeywordSets::network(),
            roles: StageRoles {
                monitor: "Traffic Monitor".to_string(),
                analyzer: "Data Analyzer".to_string(),
                strategist: "Decision Maker".to_string(),
                actor: "VLAN Configurator".to_string(),
            },
            action_template: "simulated VLAN configuration applied for advisory '{title}'"
                .to_string(),
            prompt_template: NETWORK_PROMPT.to_string(),
        }
    }

    /// Render the oracle prompt for one item
    pub fn render_prompt(&self, title: &str, description: &str) -> String {
        self.prompt_template
            .replace("{title}", title)
            .replace("{description}", description)
    }

    /// Render the simulated action detail for one item title
    pub fn render_action(&self, title: &str) -> String {
        self.action_template.replace("{title}", title)
    }
}

const GOVERNANCE_PROMPT: &str = "You are a DAO governance analyst agent. Analyze the following governance proposal.
Understand its objectives, arguments for and against it (if mentioned in the description), and potential impacts on the DAO and its community.
Identify any potential risks or benefits associated with the proposal.
Provide a concise analysis report summarizing your understanding and insights about the proposal.

Proposal Title: {title}
Proposal Description: {description}

Respond with a detailed analysis report.";

const NETWORK_PROMPT: &str = "You are a network analyst agent. Analyze the following network traffic advisory.
Identify any VLANs that are significantly congested (high traffic load) or have unusually high traffic compared to others.
Suggest potential VLAN adjustments to alleviate congestion, if needed.
If no adjustments are needed, state that clearly.

Advisory: {title}
Details: {description}

Respond with a concise analysis report and VLAN adjustment recommendations (if any).";
