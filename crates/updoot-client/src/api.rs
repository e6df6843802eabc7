//! Typed access to the Updoot REST backend.
//!
//! Every resource lives under its own namespace (`/api/user`, `/api/proposal`,
//! ...). Calls are a plain GET or a POST with a JSON body, and every response
//! is a `{ status, message }` envelope.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, warn};
use updoot_core::types::{
    ApprovalStatus, Artist, Bookmark, Campaign, Comment, Company, Like, PcKind, Proposal,
    ReportStatus, Transaction, User, Vote,
};
use updoot_core::Role;

use crate::config::BackendConfig;
use crate::error::{ClientError, Result};
use crate::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Artist,
    Auth,
    Campaign,
    Comment,
    Company,
    Like,
    Proposal,
    ReportComment,
    Reward,
    User,
}

impl Namespace {
    pub fn name(&self) -> &'static str {
        match self {
            Namespace::Artist => "artist",
            Namespace::Auth => "auth",
            Namespace::Campaign => "campaign",
            Namespace::Comment => "comment",
            Namespace::Company => "company",
            Namespace::Like => "like",
            Namespace::Proposal => "proposal",
            Namespace::ReportComment => "reportComment",
            Namespace::Reward => "reward",
            Namespace::User => "user",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Response wrapper shared by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub status: String,
    pub message: T,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

impl Envelope<Value> {
    /// Decodes the message of a successful envelope; anything else is a backend error.
    pub fn into_message<T: DeserializeOwned>(self) -> Result<T> {
        if !self.is_success() {
            let message = match self.message {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(ClientError::Backend {
                status: self.status,
                message,
            });
        }
        Ok(serde_json::from_value(self.message)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposalList {
    #[serde(default, alias = "proposals")]
    proposal_list: Vec<Proposal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CampaignList {
    #[serde(default)]
    campaign_list: Vec<Campaign>,
}

#[derive(Debug, Deserialize)]
struct CommentList {
    #[serde(default)]
    comment: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
struct BookmarkMessage {
    bookmark: Option<Bookmark>,
}

#[derive(Debug, Deserialize)]
struct LikeList {
    #[serde(default)]
    likes: Vec<Like>,
}

#[derive(Debug, Deserialize)]
struct VoteList {
    #[serde(default)]
    votes: Vec<Vote>,
}

#[derive(Debug, Deserialize)]
struct SponsorList {
    #[serde(default)]
    sponsors: Vec<User>,
}

/// Stardust and WeMake transactions of one user.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct WalletHistory {
    #[serde(rename = "SDTxns", default)]
    pub stardust: Vec<Transaction>,
    #[serde(rename = "WMTxns", default)]
    pub wemake: Vec<Transaction>,
}

/// Body for creating or launching a campaign from an approved proposal.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDraft {
    pub title: String,
    pub details: Option<String>,
    pub proposal_id: String,
    pub type_id: String,
    pub target: f64,
    #[serde(rename = "targetWM")]
    pub target_wm: f64,
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignPublish {
    Create,
    Launch,
}

/// Body for saving a proposal written by a fan.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    /// Set once the draft exists on the backend.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub details: String,
    pub artist_id: Vec<String>,
    pub sponsors: Vec<String>,
    /// Object key of the uploaded title image.
    pub title_image: Option<String>,
    pub supporting_materials: Vec<String>,
    /// Author email.
    pub author: String,
    pub company_id: String,
    pub brand: Vec<String>,
}

impl ProposalDraft {
    /// Sets the artists and derives the owning company and brands from them.
    pub fn with_artists(mut self, artists: &[Artist]) -> Self {
        self.artist_id = artists.iter().map(|a| a.id.clone()).collect();
        self.company_id = artists.first().map(|a| a.company_id.clone()).unwrap_or_default();
        self.brand.clear();
        for artist in artists {
            if !self.brand.contains(&artist.brand) {
                self.brand.push(artist.brand.clone());
            }
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalSave {
    /// Saved to the author's drafts; updates the existing draft when it has an id.
    Draft,
    /// Submitted for review. Needs a title image.
    Publish,
}

#[derive(Debug, Deserialize)]
struct SavedProposal {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(rename = "proposalId", default)]
    proposal_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{namespace}{endpoint}` followed by `params` as escaped path segments.
    pub fn url(&self, ns: Namespace, endpoint: &str, params: &[&str]) -> Result<Url> {
        let raw = format!("{}/{}{}", self.base_url, ns.name(), endpoint);
        let mut url = Url::parse(&raw).map_err(|e| ClientError::Config(format!("{}: {}", raw, e)))?;
        if !params.is_empty() {
            url.path_segments_mut()
                .map_err(|_| ClientError::Config(format!("{}: not a base url", raw)))?
                .pop_if_empty()
                .extend(params);
        }
        Ok(url)
    }

    pub async fn get_envelope(&self, ns: Namespace, endpoint: &str, params: &[&str]) -> Result<Envelope<Value>> {
        let url = self.url(ns, endpoint, params)?;
        debug!(%url, "GET");
        let response = self.http.get(url).send().await;
        self.finish(ns, "GET", response).await
    }

    pub async fn post_envelope<B: Serialize + ?Sized>(
        &self,
        ns: Namespace,
        endpoint: &str,
        params: &[&str],
        body: &B,
    ) -> Result<Envelope<Value>> {
        let url = self.url(ns, endpoint, params)?;
        debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await;
        self.finish(ns, "POST", response).await
    }

    async fn finish(
        &self,
        ns: Namespace,
        method: &'static str,
        response: reqwest::Result<reqwest::Response>,
    ) -> Result<Envelope<Value>> {
        metrics::REQUESTS_TOTAL.with_label_values(&[ns.name(), method]).inc();
        let envelope = match response {
            Ok(r) => r.json::<Envelope<Value>>().await,
            Err(e) => Err(e),
        };
        envelope.map_err(|e| {
            metrics::FAILURES_TOTAL.with_label_values(&[ns.name(), method]).inc();
            warn!(namespace = %ns, method, error = %e, "backend request failed");
            ClientError::Http(e)
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, ns: Namespace, endpoint: &str, params: &[&str]) -> Result<T> {
        self.get_envelope(ns, endpoint, params).await?.into_message()
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        ns: Namespace,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.post_envelope(ns, endpoint, &[], body).await?.into_message()
    }

    /// POST whose message is irrelevant; only the status is checked.
    pub async fn post_ok<B: Serialize + ?Sized>(&self, ns: Namespace, endpoint: &str, body: &B) -> Result<()> {
        let _: Value = self.post(ns, endpoint, body).await?;
        Ok(())
    }

    // --- users ---

    pub async fn user_by_username(&self, username: &str) -> Result<User> {
        self.get(Namespace::User, "/getUserByUsername", &[username]).await
    }

    pub async fn bookmarks(&self, email: &str) -> Result<Option<Bookmark>> {
        let message: BookmarkMessage = self.get(Namespace::User, "/bookmark", &[email]).await?;
        Ok(message.bookmark)
    }

    pub async fn add_bookmark(&self, email: &str, kind: PcKind, item_id: &str) -> Result<()> {
        self.post_ok(Namespace::User, "/bookmark/add", &bookmark_body(email, kind, item_id)).await
    }

    pub async fn delete_bookmark(&self, email: &str, kind: PcKind, item_id: &str) -> Result<()> {
        self.post_ok(Namespace::User, "/bookmark/delete", &bookmark_body(email, kind, item_id)).await
    }

    pub async fn likes(&self, username: &str) -> Result<Vec<Like>> {
        let message: LikeList = self.get(Namespace::User, "/like/getAllLikes", &[username]).await?;
        Ok(message.likes)
    }

    pub async fn votes(&self, username: &str) -> Result<Vec<Vote>> {
        let message: VoteList = self.get(Namespace::User, "/vote/getAllVotes", &[username]).await?;
        Ok(message.votes)
    }

    pub async fn has_voted(&self, username: &str, item_id: &str) -> Result<bool> {
        Ok(self.votes(username).await?.iter().any(|v| v.type_id == item_id))
    }

    pub async fn wallet_history(&self, username: &str) -> Result<WalletHistory> {
        self.get(Namespace::User, "/transactionByUsername/all", &[username]).await
    }

    pub async fn update_profile_picture(&self, username: &str, key: &str) -> Result<()> {
        let body = json!({ "username": username, "profilePicture": key });
        self.post_ok(Namespace::User, "/updateProfilePic", &body).await
    }

    // --- auth ---

    /// Creates the backend account once the auth provider confirmed the sign-up.
    pub async fn register(&self, username: &str, email: &str, role: Role) -> Result<()> {
        let body = json!({ "username": username, "email": email, "role": role });
        self.post_ok(Namespace::Auth, "/register", &body).await
    }

    // --- proposals ---

    pub async fn proposals(&self) -> Result<Vec<Proposal>> {
        let list: ProposalList = self.get(Namespace::Proposal, "/all", &[]).await?;
        Ok(list.proposal_list)
    }

    pub async fn proposal(&self, id: &str) -> Result<Proposal> {
        self.get(Namespace::Proposal, "", &[id]).await
    }

    pub async fn company_proposals(&self, company_id: &str) -> Result<Vec<Proposal>> {
        let list: ProposalList = self.get(Namespace::Proposal, "/company", &[company_id]).await?;
        Ok(list.proposal_list)
    }

    pub async fn sponsored_proposals(&self, email: &str) -> Result<Vec<Proposal>> {
        let list: ProposalList = self.get(Namespace::Proposal, "/sponsor", &[email]).await?;
        Ok(list.proposal_list)
    }

    pub async fn user_drafts(&self, email: &str) -> Result<Vec<Proposal>> {
        let list: ProposalList = self.get(Namespace::Proposal, "/userDrafts", &[email]).await?;
        Ok(list.proposal_list)
    }

    pub async fn user_submissions(&self, email: &str) -> Result<Vec<Proposal>> {
        let list: ProposalList = self.get(Namespace::Proposal, "/userSubmits", &[email]).await?;
        Ok(list.proposal_list)
    }

    pub async fn sponsors(&self, company_ids: &[String]) -> Result<Vec<User>> {
        let list: SponsorList = self
            .post(Namespace::Proposal, "/sponsors", &json!({ "companiesId": company_ids }))
            .await?;
        Ok(list.sponsors)
    }

    /// Creates, updates or submits a proposal and returns its id.
    pub async fn save_proposal(&self, mode: ProposalSave, draft: &ProposalDraft) -> Result<String> {
        let endpoint = match (mode, &draft.id) {
            (ProposalSave::Draft, Some(_)) => "/updateProposalContent",
            (ProposalSave::Draft, None) => "/create",
            (ProposalSave::Publish, _) => "/submit",
        };
        if mode == ProposalSave::Publish && draft.title_image.as_deref().map_or(true, str::is_empty) {
            return Err(ClientError::Invalid(
                "a title image is required for publishing a proposal".to_string(),
            ));
        }
        let saved: SavedProposal = self.post(Namespace::Proposal, endpoint, draft).await?;
        saved
            .id
            .or(saved.proposal_id)
            .ok_or_else(|| ClientError::Invalid("proposal could not be created".to_string()))
    }

    pub async fn like(&self, kind: PcKind, username: &str, item_id: &str, is_add: bool) -> Result<()> {
        let body = json!({ "username": username, "typeId": item_id, "isAdd": is_add });
        self.post_ok(Namespace::Proposal, &format!("/like?type={}", kind), &body).await
    }

    pub async fn vote(&self, kind: PcKind, username: &str, item_id: &str) -> Result<()> {
        let ns = match kind {
            PcKind::Proposal => Namespace::Proposal,
            PcKind::Campaign => Namespace::Campaign,
        };
        self.post_ok(ns, "/vote", &json!({ "username": username, "typeId": item_id })).await
    }

    pub async fn update_proposal_approval(&self, proposal_id: &str, status: ApprovalStatus) -> Result<()> {
        let body = json!({ "_id": proposal_id, "status": status });
        self.post_ok(Namespace::Proposal, "/updateApprovalStatus", &body).await
    }

    pub async fn update_sponsor_status(&self, proposal_id: &str, email: &str, status: ApprovalStatus) -> Result<()> {
        let body = json!({ "proposalId": proposal_id, "email": email, "status": status });
        self.post_ok(Namespace::Proposal, "/updateSponsorStatus", &body).await
    }

    // --- campaigns ---

    pub async fn campaigns(&self) -> Result<Vec<Campaign>> {
        let list: CampaignList = self.get(Namespace::Campaign, "/all", &[]).await?;
        Ok(list.campaign_list)
    }

    pub async fn campaign(&self, id: &str) -> Result<Campaign> {
        self.get(Namespace::Campaign, "", &[id]).await
    }

    pub async fn company_draft_campaigns(&self, company_id: &str) -> Result<Vec<Campaign>> {
        let list: CampaignList = self.get(Namespace::Campaign, "/company/draft", &[company_id]).await?;
        Ok(list.campaign_list)
    }

    pub async fn company_ended_campaigns(&self, company_id: &str) -> Result<Vec<Campaign>> {
        let list: CampaignList = self.get(Namespace::Campaign, "/company/ended", &[company_id]).await?;
        Ok(list.campaign_list)
    }

    pub async fn campaign_transactions(&self, campaign_id: &str) -> Result<Vec<Transaction>> {
        let mut txs: Vec<Transaction> = self.get(Namespace::Campaign, "/transactions", &[campaign_id])
            .await?;
        txs.sort_by_key(|tx| tx.timestamp);
        Ok(txs)
    }

    /// Raw activity series for the campaign statistics chart.
    pub async fn campaign_activities(&self, campaign_id: &str) -> Result<Value> {
        let message: Value = self.get(Namespace::Campaign, "/activities", &[campaign_id]).await?;
        Ok(message.get("graphData").cloned().unwrap_or(Value::Null))
    }

    pub async fn donate(&self, username: &str, campaign_id: &str, amount: f64) -> Result<()> {
        let body = json!({ "username": username, "campaignId": campaign_id, "WMamount": amount });
        self.post_ok(Namespace::Campaign, "/donate", &body).await
    }

    pub async fn publish_campaign(&self, mode: CampaignPublish, draft: &CampaignDraft) -> Result<()> {
        let endpoint = match mode {
            CampaignPublish::Create => "/create",
            CampaignPublish::Launch => "/launch",
        };
        self.post_ok(Namespace::Campaign, endpoint, draft).await
    }

    // --- comments and reports ---

    pub async fn create_comment(&self, username: &str, kind: PcKind, item_id: &str, content: &str) -> Result<Comment> {
        let body = json!({ "username": username, "type": kind, "typeId": item_id, "content": content });
        self.post(Namespace::Comment, "/create", &body).await
    }

    pub async fn comments_by_username(&self, username: &str) -> Result<Vec<Comment>> {
        let list: CommentList = self.get(Namespace::Comment, "/getByUsername", &[username]).await?;
        Ok(list.comment)
    }

    pub async fn comments_by_company(&self, company_id: &str) -> Result<Vec<Comment>> {
        let list: CommentList = self.get(Namespace::Comment, "/getAllByCompanyId", &[company_id])
            .await?;
        Ok(list.comment)
    }

    /// One entry per report, so a comment reported twice shows up twice.
    pub async fn reported_comments(&self) -> Result<Vec<Comment>> {
        let list: CommentList = self.get(Namespace::Comment, "/getAllReported", &[]).await?;
        Ok(list
            .comment
            .into_iter()
            .flat_map(|comment| {
                let reports = comment.report.clone();
                reports.into_iter().map(move |report| Comment {
                    report: vec![report],
                    ..comment.clone()
                })
            })
            .collect())
    }

    pub async fn update_comment_approval(&self, comment_id: &str, status: ApprovalStatus) -> Result<()> {
        let body = json!({ "status": status });
        let envelope = self
            .post_envelope(Namespace::Comment, "/updateApprovalStatus", &[comment_id], &body)
            .await?;
        let _: Value = envelope.into_message()?;
        Ok(())
    }

    pub async fn report_comment(&self, reporter_email: &str, comment_id: &str, reason: &str) -> Result<()> {
        let body = json!({ "reporterEmail": reporter_email, "reportedCommentId": comment_id, "reason": reason });
        self.post_ok(Namespace::ReportComment, "/create", &body).await
    }

    pub async fn update_report_status(&self, report_id: &str, comment_id: &str, status: ReportStatus) -> Result<()> {
        let body = json!({ "_id": report_id, "reportedCommentId": comment_id, "status": status });
        self.post_ok(Namespace::ReportComment, "/updateStatus", &body).await
    }

    /// Pays the comment reward once a comment is approved.
    pub async fn reward_comment(&self, kind: PcKind, company_name: &str, receiver: &str, item_id: &str) -> Result<()> {
        let body = json!({ "companyName": company_name, "receiverName": receiver, "typeId": item_id });
        let endpoint = format!("/{}", kind.as_str().to_lowercase());
        self.post_ok(Namespace::Reward, &endpoint, &body).await
    }

    // --- companies and artists ---

    pub async fn company(&self, id: &str) -> Result<Company> {
        self.get(Namespace::Company, "", &[id]).await
    }

    pub async fn artists(&self) -> Result<Vec<Artist>> {
        self.get(Namespace::Artist, "/all", &[]).await
    }

    pub async fn artist(&self, id: &str) -> Result<Artist> {
        self.get(Namespace::Artist, "", &[id]).await
    }
}

fn bookmark_body(email: &str, kind: PcKind, item_id: &str) -> Value {
    let (proposals, campaigns): (Vec<&str>, Vec<&str>) = match kind {
        PcKind::Proposal => (vec![item_id], vec![]),
        PcKind::Campaign => (vec![], vec![item_id]),
    };
    json!({
        "email": email,
        "proposalBookmarks": proposals,
        "campaignBookmarks": campaigns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = ApiClient::with_base_url("http://localhost:8000/api/");
        assert_eq!(
            client.url(Namespace::ReportComment, "/create", &[]).unwrap().as_str(),
            "http://localhost:8000/api/reportComment/create"
        );
        assert_eq!(
            client.url(Namespace::Proposal, "", &["p1"]).unwrap().as_str(),
            "http://localhost:8000/api/proposal/p1"
        );
    }

    #[test]
    fn test_path_params_are_escaped() {
        let client = ApiClient::with_base_url("http://localhost:8000/api");
        let url = client.url(Namespace::User, "/bookmark", &["a#b?c/d@x.co"]).unwrap();
        assert_eq!(url.path(), "/api/user/bookmark/a%23b%3Fc%2Fd@x.co");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());

        let like = client.url(Namespace::Proposal, "/like?type=Campaign", &[]).unwrap();
        assert_eq!(like.query(), Some("type=Campaign"));
    }

    #[test]
    fn test_draft_with_artists() {
        let artist = |id: &str, brand: &str, company: &str| Artist {
            id: id.into(),
            name: id.into(),
            brand: brand.into(),
            company_id: company.into(),
            profile_pic: String::new(),
            company: None,
        };
        let draft = ProposalDraft::default().with_artists(&[
            artist("a1", "NOVA", "c1"),
            artist("a2", "NOVA", "c1"),
            artist("a3", "LUX", "c2"),
        ]);
        assert_eq!(draft.artist_id, vec!["a1", "a2", "a3"]);
        assert_eq!(draft.company_id, "c1");
        assert_eq!(draft.brand, vec!["NOVA", "LUX"]);

        let body = serde_json::to_value(&draft).unwrap();
        assert!(body.get("_id").is_none());
        assert_eq!(body["artistId"], json!(["a1", "a2", "a3"]));
    }

    #[test]
    fn test_failed_envelope_is_backend_error() {
        let envelope = Envelope {
            status: "Failed".to_string(),
            message: json!("User not found"),
        };
        match envelope.into_message::<User>() {
            Err(ClientError::Backend { status, message }) => {
                assert_eq!(status, "Failed");
                assert_eq!(message, "User not found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_bookmark_body_by_kind() {
        let body = bookmark_body("a@b.c", PcKind::Campaign, "c1");
        assert_eq!(body["proposalBookmarks"], json!([]));
        assert_eq!(body["campaignBookmarks"], json!(["c1"]));
    }
}
