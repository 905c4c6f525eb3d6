use serde::{Deserialize, Serialize};

/// Installation credentials for one workspace in a multi-workspace
/// deployment. Owned by the OAuth install flow; the bot only ever reads
/// these to resolve which token to post with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCredential {
    pub team_id: String,
    pub bot_token: String,
    pub app_id: String,
}
