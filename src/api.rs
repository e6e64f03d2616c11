//! Typed endpoint facade.
//!
//! Every method builds one [`RequestDescriptor`] with a fixed method and path, maps its
//! arguments onto query or body fields, and delegates to [`Client::execute_as`]. No endpoint
//! adds failure or concurrency behavior of its own; resilience lives entirely in the
//! executor.

pub mod models;

pub use models::*;

// self
use crate::{
	_prelude::*,
	client::Client,
	http::{HttpTransport, TransportErrorMapper},
	request::RequestDescriptor,
};

/// IDs accepted per batch by the trash/recover/delete endpoints.
const BATCH_LIMIT: usize = 100;

/// Query for the cursor-based `api/v2/file/list` endpoint, including search.
#[derive(Clone, Debug)]
pub struct ListFilesQuery {
	parent_file_id: i64,
	limit: u32,
	search_data: Option<String>,
	search_mode: Option<u8>,
	last_file_id: Option<i64>,
}
impl ListFilesQuery {
	/// Starts a query for the given folder with the service's maximum page size.
	pub fn new(parent_file_id: i64) -> Self {
		Self { parent_file_id, limit: 100, search_data: None, search_mode: None, last_file_id: None }
	}

	/// Overrides the page size.
	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = limit;

		self
	}

	/// Filters entries by a search term (`0` fuzzy, `1` exact via [`Self::with_search_mode`]).
	pub fn with_search(mut self, search_data: impl Into<String>) -> Self {
		self.search_data = Some(search_data.into());

		self
	}

	/// Overrides the search mode.
	pub fn with_search_mode(mut self, search_mode: u8) -> Self {
		self.search_mode = Some(search_mode);

		self
	}

	/// Resumes listing from a previous page's cursor.
	pub fn with_cursor(mut self, last_file_id: i64) -> Self {
		self.last_file_id = Some(last_file_id);

		self
	}
}
impl Default for ListFilesQuery {
	fn default() -> Self {
		Self::new(0)
	}
}

/// Query for the offset-based `api/v1/file/list` endpoint.
#[derive(Clone, Debug)]
pub struct ListFilesV1Query {
	parent_file_id: i64,
	page: u32,
	limit: u32,
	order_by: String,
	order_direction: String,
	trashed: bool,
	search_data: Option<String>,
}
impl ListFilesV1Query {
	/// Starts a query for the given folder, ordered by file name ascending.
	pub fn new(parent_file_id: i64) -> Self {
		Self {
			parent_file_id,
			page: 1,
			limit: 100,
			order_by: "file_name".into(),
			order_direction: "asc".into(),
			trashed: false,
			search_data: None,
		}
	}

	/// Selects a page (1-based).
	pub fn with_page(mut self, page: u32) -> Self {
		self.page = page;

		self
	}

	/// Overrides the page size.
	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = limit;

		self
	}

	/// Orders by the given column (`file_name`, `size`, `create_at`, ...).
	pub fn with_order(mut self, order_by: impl Into<String>, descending: bool) -> Self {
		self.order_by = order_by.into();
		self.order_direction = if descending { "desc".into() } else { "asc".into() };

		self
	}

	/// Lists the recycle bin instead of live entries.
	pub fn with_trashed(mut self, trashed: bool) -> Self {
		self.trashed = trashed;

		self
	}

	/// Filters entries by a search term.
	pub fn with_search(mut self, search_data: impl Into<String>) -> Self {
		self.search_data = Some(search_data.into());

		self
	}
}
impl Default for ListFilesV1Query {
	fn default() -> Self {
		Self::new(0)
	}
}

/// Parameters for `api/v1/share/create`.
#[derive(Clone, Debug)]
pub struct CreateShareRequest {
	share_name: String,
	share_expire: u32,
	file_ids: Vec<i64>,
	share_pwd: Option<String>,
	traffic_switch: Option<u8>,
	traffic_limit_switch: Option<u8>,
	traffic_limit: Option<u64>,
}
impl CreateShareRequest {
	/// Creates a share of the given files expiring after `share_expire` days (`0` = never).
	pub fn new(share_name: impl Into<String>, share_expire: u32, file_ids: Vec<i64>) -> Self {
		Self {
			share_name: share_name.into(),
			share_expire,
			file_ids,
			share_pwd: None,
			traffic_switch: None,
			traffic_limit_switch: None,
			traffic_limit: None,
		}
	}

	/// Protects the share with an extraction code.
	pub fn with_password(mut self, share_pwd: impl Into<String>) -> Self {
		self.share_pwd = Some(share_pwd.into());

		self
	}

	/// Overrides the traffic accounting switch.
	pub fn with_traffic_switch(mut self, traffic_switch: u8) -> Self {
		self.traffic_switch = Some(traffic_switch);

		self
	}

	/// Caps the share's total download traffic in bytes.
	pub fn with_traffic_limit(mut self, traffic_limit: u64) -> Self {
		self.traffic_limit_switch = Some(2);
		self.traffic_limit = Some(traffic_limit);

		self
	}

	fn into_body(self) -> serde_json::Value {
		let file_id_list =
			self.file_ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
		let mut body = serde_json::json!({
			"shareName": self.share_name,
			"shareExpire": self.share_expire,
			"fileIDList": file_id_list,
		});

		if let Some(share_pwd) = self.share_pwd {
			body["sharePwd"] = share_pwd.into();
		}
		if let Some(traffic_switch) = self.traffic_switch {
			body["trafficSwitch"] = traffic_switch.into();
		}
		if let Some(traffic_limit_switch) = self.traffic_limit_switch {
			body["trafficLimitSwitch"] = traffic_limit_switch.into();
		}
		if let Some(traffic_limit) = self.traffic_limit {
			body["trafficLimit"] = traffic_limit.into();
		}

		body
	}
}

/// Parameters for `api/v1/share/list/info`.
#[derive(Clone, Debug)]
pub struct EditShareRequest {
	share_ids: Vec<i64>,
	traffic_switch: Option<u8>,
	traffic_limit_switch: Option<u8>,
	traffic_limit: Option<u64>,
}
impl EditShareRequest {
	/// Starts an edit of the given shares; only the provided settings are changed.
	pub fn new(share_ids: Vec<i64>) -> Self {
		Self { share_ids, traffic_switch: None, traffic_limit_switch: None, traffic_limit: None }
	}

	/// Overrides the traffic accounting switch.
	pub fn with_traffic_switch(mut self, traffic_switch: u8) -> Self {
		self.traffic_switch = Some(traffic_switch);

		self
	}

	/// Caps the shares' total download traffic in bytes.
	pub fn with_traffic_limit(mut self, traffic_limit: u64) -> Self {
		self.traffic_limit_switch = Some(2);
		self.traffic_limit = Some(traffic_limit);

		self
	}

	fn into_body(self) -> serde_json::Value {
		let mut body = serde_json::json!({ "shareIdList": self.share_ids });

		if let Some(traffic_switch) = self.traffic_switch {
			body["trafficSwitch"] = traffic_switch.into();
		}
		if let Some(traffic_limit_switch) = self.traffic_limit_switch {
			body["trafficLimitSwitch"] = traffic_limit_switch.into();
		}
		if let Some(traffic_limit) = self.traffic_limit {
			body["trafficLimit"] = traffic_limit.into();
		}

		body
	}
}

/// Parameters for `api/v1/share/content-payment/create`.
#[derive(Clone, Debug)]
pub struct CreatePaymentShareRequest {
	share_name: String,
	file_ids: Vec<i64>,
	pay_amount: u32,
	resource_desc: String,
	is_reward: bool,
}
impl CreatePaymentShareRequest {
	/// Creates a paid share of the given files at `pay_amount` (in yuan).
	pub fn new(
		share_name: impl Into<String>,
		file_ids: Vec<i64>,
		pay_amount: u32,
		resource_desc: impl Into<String>,
	) -> Self {
		Self {
			share_name: share_name.into(),
			file_ids,
			pay_amount,
			resource_desc: resource_desc.into(),
			is_reward: false,
		}
	}

	/// Marks the payment as a reward instead of a purchase.
	pub fn with_reward(mut self, is_reward: bool) -> Self {
		self.is_reward = is_reward;

		self
	}

	fn into_body(self) -> serde_json::Value {
		let file_id_list =
			self.file_ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");

		serde_json::json!({
			"shareName": self.share_name,
			"fileIDList": file_id_list,
			"payAmount": self.pay_amount,
			"resourceDesc": self.resource_desc,
			"isReward": self.is_reward as u8,
		})
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::Error>,
{
	/// Fetches the account profile.
	pub async fn user_info(&self) -> Result<UserInfo> {
		self.execute_as(&RequestDescriptor::get("api/v1/user/info")).await
	}

	/// Fetches metadata for a single file.
	pub async fn file_detail(&self, file_id: i64) -> Result<FileInfo> {
		self.execute_as(&RequestDescriptor::get("api/v1/file/detail").with_query("fileID", file_id))
			.await
	}

	/// Fetches metadata for several files at once.
	pub async fn file_infos(&self, file_ids: &[i64]) -> Result<Vec<FileInfo>> {
		let descriptor = RequestDescriptor::post("api/v1/file/infos")
			.with_body(serde_json::json!({ "fileIDs": file_ids }));
		let list: FileInfoList = self.execute_as(&descriptor).await?;

		Ok(list.file_list)
	}

	/// Lists (or searches) a folder via the cursor-based v2 endpoint.
	pub async fn list_files(&self, query: &ListFilesQuery) -> Result<FileListPage> {
		self.execute_as(&list_files_descriptor(query)).await
	}

	/// Lists (or searches) a folder via the offset-based v1 endpoint.
	pub async fn list_files_v1(&self, query: &ListFilesV1Query) -> Result<FileListPageV1> {
		self.execute_as(&list_files_v1_descriptor(query)).await
	}

	/// Creates a folder under `parent_id`.
	pub async fn create_folder(&self, name: &str, parent_id: i64) -> Result<FolderCreated> {
		let descriptor = RequestDescriptor::post("upload/v1/file/mkdir")
			.with_body(serde_json::json!({ "name": name, "parentID": parent_id }));

		self.execute_as(&descriptor).await
	}

	/// Moves files into another folder.
	pub async fn move_files(&self, file_ids: &[i64], to_parent_file_id: i64) -> Result<()> {
		let descriptor = RequestDescriptor::post("api/v1/file/move").with_body(serde_json::json!({
			"fileIDs": file_ids,
			"toParentFileID": to_parent_file_id,
		}));

		self.execute(&descriptor).await.map(|_| ())
	}

	/// Renames a single file.
	pub async fn rename_file(&self, file_id: i64, file_name: &str) -> Result<()> {
		let descriptor = RequestDescriptor::put("api/v1/file/name").with_body(serde_json::json!({
			"fileID": file_id,
			"fileName": file_name,
		}));

		self.execute(&descriptor).await.map(|_| ())
	}

	/// Renames several files in one call; pairs are `(file_id, new_name)`.
	pub async fn rename_files(&self, renames: &[(i64, String)]) -> Result<()> {
		let rename_list = renames
			.iter()
			.map(|(file_id, file_name)| format!("{file_id}|{file_name}"))
			.collect::<Vec<_>>();
		let descriptor = RequestDescriptor::post("api/v1/file/rename")
			.with_body(serde_json::json!({ "renameList": rename_list }));

		self.execute(&descriptor).await.map(|_| ())
	}

	/// Moves files into the recycle bin, batching per the service limit.
	pub async fn trash_files(&self, file_ids: &[i64]) -> Result<()> {
		self.batched("api/v1/file/trash", file_ids).await
	}

	/// Restores files from the recycle bin, batching per the service limit.
	pub async fn recover_files(&self, file_ids: &[i64]) -> Result<()> {
		self.batched("api/v1/file/recover", file_ids).await
	}

	/// Permanently deletes files from the recycle bin, batching per the service limit.
	pub async fn delete_files(&self, file_ids: &[i64]) -> Result<()> {
		self.batched("api/v1/file/delete", file_ids).await
	}

	/// Obtains a short-lived direct download URL for a file.
	pub async fn download_info(&self, file_id: i64) -> Result<DownloadInfo> {
		self.execute_as(
			&RequestDescriptor::get("api/v1/file/download_info").with_query("fileId", file_id),
		)
		.await
	}

	/// Lists shares created by the account.
	pub async fn share_list(&self, limit: u32, last_share_id: i64) -> Result<ShareListPage> {
		let descriptor = RequestDescriptor::get("api/v1/share/list")
			.with_query("limit", limit)
			.with_query("lastShareId", last_share_id);

		self.execute_as(&descriptor).await
	}

	/// Creates a share link.
	pub async fn create_share(&self, request: CreateShareRequest) -> Result<ShareCreated> {
		let descriptor =
			RequestDescriptor::post("api/v1/share/create").with_body(request.into_body());

		self.execute_as(&descriptor).await
	}

	/// Updates traffic settings of existing shares.
	pub async fn edit_shares(&self, request: EditShareRequest) -> Result<()> {
		let descriptor =
			RequestDescriptor::put("api/v1/share/list/info").with_body(request.into_body());

		self.execute(&descriptor).await.map(|_| ())
	}

	/// Creates a paid share link.
	pub async fn create_payment_share(
		&self,
		request: CreatePaymentShareRequest,
	) -> Result<ShareCreated> {
		let descriptor = RequestDescriptor::post("api/v1/share/content-payment/create")
			.with_body(request.into_body());

		self.execute_as(&descriptor).await
	}

	/// Queues an offline download of `url` into folder `dir_id`.
	pub async fn offline_download(
		&self,
		url: &str,
		dir_id: i64,
		file_name: Option<&str>,
		callback_url: Option<&str>,
	) -> Result<OfflineTaskCreated> {
		let mut body = serde_json::json!({ "url": url, "dirID": dir_id });

		if let Some(file_name) = file_name {
			body["fileName"] = file_name.into();
		}
		if let Some(callback_url) = callback_url {
			body["callBackUrl"] = callback_url.into();
		}

		self.execute_as(&RequestDescriptor::post("api/v1/offline/download").with_body(body)).await
	}

	/// Reports progress of a queued offline download.
	pub async fn offline_progress(&self, task_id: i64) -> Result<OfflineProgress> {
		self.execute_as(
			&RequestDescriptor::get("api/v1/offline/download/progress")
				.with_query("taskID", task_id),
		)
		.await
	}

	async fn batched(&self, path: &'static str, file_ids: &[i64]) -> Result<()> {
		for chunk in file_ids.chunks(BATCH_LIMIT) {
			let descriptor =
				RequestDescriptor::post(path).with_body(serde_json::json!({ "fileIDs": chunk }));

			self.execute(&descriptor).await?;
		}

		Ok(())
	}
}

fn list_files_descriptor(query: &ListFilesQuery) -> RequestDescriptor {
	RequestDescriptor::get("api/v2/file/list")
		.with_query("parentFileId", query.parent_file_id)
		.with_query("limit", query.limit)
		.with_query_opt("searchData", query.search_data.as_deref())
		.with_query_opt("searchMode", query.search_mode)
		.with_query_opt("lastFileId", query.last_file_id)
}

fn list_files_v1_descriptor(query: &ListFilesV1Query) -> RequestDescriptor {
	RequestDescriptor::get("api/v1/file/list")
		.with_query("parentFileId", query.parent_file_id)
		.with_query("page", query.page)
		.with_query("limit", query.limit)
		.with_query("orderBy", &query.order_by)
		.with_query("orderDirection", &query.order_direction)
		.with_query("trashed", query.trashed as u8)
		.with_query_opt("searchData", query.search_data.as_deref())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::request::Method;

	#[test]
	fn list_descriptor_maps_search_and_cursor() {
		let query = ListFilesQuery::new(42).with_limit(50).with_search("report").with_cursor(7);
		let descriptor = list_files_descriptor(&query);

		assert_eq!(descriptor.method(), Method::Get);
		assert_eq!(descriptor.path(), "api/v2/file/list");
		assert_eq!(
			descriptor.query(),
			[
				("parentFileId".to_string(), "42".to_string()),
				("limit".to_string(), "50".to_string()),
				("searchData".to_string(), "report".to_string()),
				("lastFileId".to_string(), "7".to_string()),
			]
		);
	}

	#[test]
	fn list_v1_descriptor_encodes_trashed_as_integer() {
		let query = ListFilesV1Query::new(0).with_trashed(true).with_order("size", true);
		let descriptor = list_files_v1_descriptor(&query);
		let trashed =
			descriptor.query().iter().find(|(name, _)| name == "trashed").cloned().unwrap();

		assert_eq!(trashed.1, "1");

		let direction =
			descriptor.query().iter().find(|(name, _)| name == "orderDirection").cloned().unwrap();

		assert_eq!(direction.1, "desc");
	}

	#[test]
	fn edit_share_body_keeps_ids_as_an_array() {
		let body = EditShareRequest::new(vec![11, 12]).into_body();

		assert_eq!(body["shareIdList"], serde_json::json!([11, 12]));
		assert!(body.get("trafficSwitch").is_none());

		let body = EditShareRequest::new(vec![11])
			.with_traffic_switch(1)
			.with_traffic_limit(1 << 20)
			.into_body();

		assert_eq!(body["trafficSwitch"], 1);
		assert_eq!(body["trafficLimitSwitch"], 2);
		assert_eq!(body["trafficLimit"], 1u64 << 20);
	}

	#[test]
	fn payment_share_body_encodes_reward_as_integer() {
		let body =
			CreatePaymentShareRequest::new("course", vec![4, 5], 9, "lecture notes").into_body();

		assert_eq!(body["fileIDList"], "4,5");
		assert_eq!(body["payAmount"], 9);
		assert_eq!(body["resourceDesc"], "lecture notes");
		assert_eq!(body["isReward"], 0);

		let body = CreatePaymentShareRequest::new("course", vec![4], 9, "lecture notes")
			.with_reward(true)
			.into_body();

		assert_eq!(body["isReward"], 1);
	}

	#[test]
	fn share_body_joins_ids_and_skips_absent_options() {
		let body = CreateShareRequest::new("docs", 7, vec![1, 2, 3]).into_body();

		assert_eq!(body["fileIDList"], "1,2,3");
		assert_eq!(body["shareExpire"], 7);
		assert!(body.get("sharePwd").is_none());

		let body = CreateShareRequest::new("docs", 0, vec![9])
			.with_password("1234")
			.with_traffic_limit(1 << 30)
			.into_body();

		assert_eq!(body["sharePwd"], "1234");
		assert_eq!(body["trafficLimitSwitch"], 2);
		assert_eq!(body["trafficLimit"], 1u64 << 30);
	}
}
