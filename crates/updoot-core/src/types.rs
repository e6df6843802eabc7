use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch, as the backend stores them.
pub type EpochMillis = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Fan,
    Staff,
    Manager,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Fan, Role::Staff, Role::Manager];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Fan => "Fan",
            Role::Staff => "Staff",
            Role::Manager => "Manager",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Role {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fan" => Ok(Role::Fan),
            "staff" => Ok(Role::Staff),
            "manager" => Ok(Role::Manager),
            other => Err(crate::CoreError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

/// Kind of content item an engagement or comment refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PcKind {
    Proposal,
    Campaign,
}

impl PcKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PcKind::Proposal => "Proposal",
            PcKind::Campaign => "Campaign",
        }
    }

    /// Campaign pages live under `/campaigns`, everything else is treated as a proposal.
    pub fn from_route(path: &str) -> Self {
        match path.split('/').find(|s| !s.is_empty()) {
            Some("campaigns") => PcKind::Campaign,
            _ => PcKind::Proposal,
        }
    }
}

impl fmt::Display for PcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PcKind {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "proposal" => Ok(PcKind::Proposal),
            "campaign" => Ok(PcKind::Campaign),
            other => Err(crate::CoreError::InvalidInput(format!("unknown item kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Stardust,
    WeMake,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Stardust => "SD",
            Currency::WeMake => "WM",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub manager_role: Option<String>,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub encrypted_seed: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Fields shared by proposals and campaigns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PcBase {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub artist_id: Vec<String>,
    #[serde(default)]
    pub brand: Vec<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub votes: u64,
    #[serde(default)]
    pub cost_per_vote: f64,
    #[serde(default)]
    pub reward_per_comment: f64,
    #[serde(default)]
    pub target: f64,
    #[serde(default)]
    pub start_time: Option<EpochMillis>,
    #[serde(default)]
    pub end_time: EpochMillis,
    #[serde(default)]
    pub supporting_materials: Vec<String>,
    #[serde(default)]
    pub title_image: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default, rename = "collectedSD")]
    pub collected_sd: f64,
    #[serde(default, rename = "collectedWM")]
    pub collected_wm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Pending,
    Approval,
    Rejected,
    Draft,
    Launched,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    #[serde(flatten)]
    pub base: PcBase,
    pub status: ProposalStatus,
    #[serde(default)]
    pub sponsors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Draft,
    Launched,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(flatten)]
    pub base: PcBase,
    pub status: CampaignStatus,
    #[serde(default)]
    pub proposal_id: Option<String>,
    #[serde(default, rename = "targetWM")]
    pub target_wm: f64,
    #[serde(default)]
    pub donate_rate: Option<f64>,
    #[serde(default)]
    pub twitter_link: Option<String>,
    #[serde(default)]
    pub fb_link: Option<String>,
    #[serde(default)]
    pub ig_link: Option<String>,
}

/// Either kind of content item, as shown on a card.
#[derive(Debug, Clone, PartialEq)]
pub enum PcItem {
    Proposal(Proposal),
    Campaign(Campaign),
}

impl PcItem {
    pub fn kind(&self) -> PcKind {
        match self {
            PcItem::Proposal(_) => PcKind::Proposal,
            PcItem::Campaign(_) => PcKind::Campaign,
        }
    }

    pub fn base(&self) -> &PcBase {
        match self {
            PcItem::Proposal(p) => &p.base,
            PcItem::Campaign(c) => &c.base,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Approval,
    Pending,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalType {
    Comment,
    Proposal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub username: String,
    pub status: ApprovalStatus,
    #[serde(rename = "type")]
    pub kind: ApprovalType,
    pub type_id: String,
    pub timestamp: EpochMillis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Deleted,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: String,
    pub reporter_email: String,
    pub reported_comment_id: String,
    pub reason: String,
    #[serde(default)]
    pub details: Option<String>,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: PcKind,
    pub type_id: String,
    pub username: String,
    #[serde(default)]
    pub is_reported: bool,
    #[serde(default)]
    pub approval_id: Option<String>,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
    #[serde(default)]
    pub reward_id: Option<String>,
    #[serde(default)]
    pub approval: Option<Approval>,
    #[serde(default)]
    pub report: Vec<Report>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(rename = "type")]
    pub kind: PcKind,
    pub type_id: String,
    pub username: String,
    #[serde(default)]
    pub timestamp: EpochMillis,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PcKind,
    pub type_id: String,
    pub username: String,
    #[serde(default)]
    pub txn_id: String,
    #[serde(default)]
    pub timestamp: EpochMillis,
}

/// Per-user bookmark lists, keyed by email on the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub email: String,
    #[serde(default)]
    pub proposal_bookmarks: Vec<String>,
    #[serde(default)]
    pub campaign_bookmarks: Vec<String>,
}

impl Bookmark {
    pub fn ids_for(&self, kind: PcKind) -> &[String] {
        match kind {
            PcKind::Proposal => &self.proposal_bookmarks,
            PcKind::Campaign => &self.campaign_bookmarks,
        }
    }

    pub fn contains(&self, kind: PcKind, item_id: &str) -> bool {
        self.ids_for(kind).iter().any(|id| id == item_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    #[serde(rename = "Comment Reward")]
    CommentReward,
    Vote,
    #[serde(rename = "Create Proposal")]
    CreateProposal,
    Refund,
    #[serde(rename = "Donate WM")]
    DonateWm,
    #[serde(rename = "Donate SD")]
    DonateSd,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub amount: f64,
    pub receiver_address: String,
    pub sender_address: String,
    pub status: TxStatus,
    pub timestamp: EpochMillis,
    pub txn_id: String,
    #[serde(rename = "type")]
    pub kind: TxType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(alias = "_id")]
    pub id: String,
    pub company_name: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub brand: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub brand: String,
    pub company_id: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub company: Option<Company>,
}
