//! Wire schemas for the endpoint facade.
//!
//! Fields the service omits for some entries are optional or defaulted, so a missing value
//! and a failed fetch stay distinguishable: the former decodes to `None`/default, the latter
//! surfaces as an [`Error`](crate::error::Error).

// self
use crate::_prelude::*;

/// Account profile returned by `api/v1/user/info`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
	/// Account identifier.
	pub uid: i64,
	/// Display name.
	#[serde(default)]
	pub nickname: Option<String>,
	/// Avatar URL.
	#[serde(default)]
	pub head_image: Option<String>,
	/// Registered mail address.
	#[serde(default)]
	pub mail: Option<String>,
	/// Bytes of permanent storage quota.
	#[serde(default)]
	pub space_permanent: Option<u64>,
	/// Bytes currently used.
	#[serde(default)]
	pub space_used: Option<u64>,
	/// Bytes of temporary storage quota.
	#[serde(default)]
	pub space_temp: Option<u64>,
}

/// One file or folder entry.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
	/// File identifier.
	pub file_id: i64,
	/// Display name.
	pub filename: String,
	/// Entry type: `0` for files, `1` for folders.
	#[serde(rename = "type", default)]
	pub kind: i64,
	/// Size in bytes; zero for folders.
	#[serde(default)]
	pub size: u64,
	/// Content hash assigned by the service.
	#[serde(default)]
	pub etag: String,
	/// Audit status flag.
	#[serde(default)]
	pub status: i64,
	/// Identifier of the containing folder.
	#[serde(default)]
	pub parent_file_id: i64,
	/// Media category, when classified.
	#[serde(default)]
	pub category: Option<i64>,
	/// Non-zero when the entry sits in the recycle bin.
	#[serde(default)]
	pub trashed: Option<i64>,
}
impl FileInfo {
	/// Returns whether the entry is a folder.
	pub fn is_folder(&self) -> bool {
		self.kind == 1
	}
}

/// Cursor page returned by `api/v2/file/list`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPage {
	/// Cursor for the next page; `-1` marks the final page.
	pub last_file_id: i64,
	/// Entries of this page.
	#[serde(default)]
	pub file_list: Vec<FileInfo>,
}
impl FileListPage {
	/// Returns whether the listing is exhausted.
	pub fn is_last(&self) -> bool {
		self.last_file_id == -1
	}
}

/// Offset page returned by `api/v1/file/list`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPageV1 {
	/// Total number of entries matching the query.
	#[serde(default)]
	pub total: i64,
	/// Entries of this page.
	#[serde(default)]
	pub file_list: Vec<FileInfo>,
}

/// Payload of `api/v1/file/infos`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoList {
	/// Requested entries.
	#[serde(default)]
	pub file_list: Vec<FileInfo>,
}

/// Payload of `upload/v1/file/mkdir`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderCreated {
	/// Identifier of the new folder.
	#[serde(rename = "dirID")]
	pub dir_id: i64,
}

/// Payload of `api/v1/file/download_info`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfo {
	/// Direct download URL, valid for a limited time.
	pub download_url: String,
}

/// One share entry.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInfo {
	/// Share identifier.
	pub share_id: i64,
	/// Public share key used in share URLs.
	#[serde(default)]
	pub share_key: String,
	/// Display name of the share.
	#[serde(default)]
	pub share_name: String,
	/// Expiration timestamp, when the share is not permanent.
	#[serde(default)]
	pub expiration: Option<String>,
}

/// Cursor page returned by `api/v1/share/list`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareListPage {
	/// Cursor for the next page; `-1` marks the final page.
	pub last_share_id: i64,
	/// Shares of this page.
	#[serde(default)]
	pub share_list: Vec<ShareInfo>,
}

/// Payload of `api/v1/share/create`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareCreated {
	/// Share identifier.
	#[serde(rename = "shareID")]
	pub share_id: i64,
	/// Public share key used in share URLs.
	pub share_key: String,
}

/// Payload of `api/v1/offline/download`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineTaskCreated {
	/// Identifier of the queued task.
	#[serde(rename = "taskID")]
	pub task_id: i64,
}

/// Payload of `api/v1/offline/download/progress`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineProgress {
	/// Completion percentage in `[0, 100]`.
	#[serde(default)]
	pub process: f64,
	/// Task status flag reported by the service.
	#[serde(default)]
	pub status: i64,
}
