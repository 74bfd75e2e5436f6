use crate::cancel::CancelToken;
use crate::error::RunError;
use crate::steam::{scan_member_ids, SteamApi};

/// Accepts either a bare group id or a full community URL such as
/// `https://steamcommunity.com/groups/payload`. For URLs, the id is the path
/// segment following the literal `groups` segment.
pub fn extract_group_id(input: &str) -> String {
    if input.starts_with("http") {
        if let Ok(url) = url::Url::parse(input) {
            if let Some(segments) = url.path_segments() {
                let mut segments = segments.filter(|s| !s.is_empty());
                while let Some(segment) = segments.next() {
                    if segment == "groups" {
                        if let Some(id) = segments.next() {
                            return id.to_string();
                        }
                    }
                }
            }
        }
    }
    input.trim().to_string()
}

/// Resolves the ordered member id list for a group.
///
/// An upstream failure surfaces as `Resolution` unless the run was cancelled,
/// in which case the empty list comes back without an error.
pub async fn resolve_members(
    api: &dyn SteamApi,
    group_input: &str,
    token: &CancelToken,
) -> Result<Vec<String>, RunError> {
    let group_id = extract_group_id(group_input);
    if group_id.is_empty() {
        return Err(RunError::EmptyGroupId);
    }

    match api.member_list(&group_id).await {
        Ok(xml) => Ok(scan_member_ids(&xml)),
        Err(_) if token.is_cancelled() => Ok(Vec::new()),
        Err(source) => Err(RunError::Resolution {
            group: group_id,
            source,
        }),
    }
}
