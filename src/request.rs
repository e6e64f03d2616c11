//! Immutable request descriptors produced by the facade and consumed by the executor.

// self
use crate::_prelude::*;

/// HTTP methods used by the service surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// `GET` request.
	Get,
	/// `POST` request.
	Post,
	/// `PUT` request.
	Put,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
		}
	}
}

/// Description of one logical call, fixed at construction time.
///
/// The facade builds exactly one descriptor per call; the executor may replay it across
/// several physical attempts but never mutates it. Query parameters keep their insertion
/// order when serialized onto the URL.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	method: Method,
	path: String,
	query: Vec<(String, String)>,
	body: Option<serde_json::Value>,
	requires_auth: bool,
}
impl RequestDescriptor {
	fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: Vec::new(), body: None, requires_auth: true }
	}

	/// Starts a `GET` descriptor for the provided endpoint path.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Starts a `POST` descriptor for the provided endpoint path.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Starts a `PUT` descriptor for the provided endpoint path.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Appends one query parameter, preserving insertion order.
	pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((name.into(), value.to_string()));

		self
	}

	/// Appends one query parameter only when a value is present.
	pub fn with_query_opt(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
		match value {
			Some(value) => self.with_query(name, value),
			None => self,
		}
	}

	/// Attaches a JSON body.
	pub fn with_body(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Marks the call as unauthenticated (used by the token endpoint itself).
	pub fn public(mut self) -> Self {
		self.requires_auth = false;

		self
	}

	/// Method of the call.
	pub fn method(&self) -> Method {
		self.method
	}

	/// Endpoint path relative to the base URL.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Ordered query parameters.
	pub fn query(&self) -> &[(String, String)] {
		&self.query
	}

	/// Optional JSON body.
	pub fn body(&self) -> Option<&serde_json::Value> {
		self.body.as_ref()
	}

	/// Whether the executor must attach a bearer credential.
	pub fn requires_auth(&self) -> bool {
		self.requires_auth
	}

	/// Resolves the descriptor against a base URL, appending query parameters in order.
	pub fn url(&self, base: &Url) -> Result<Url> {
		let mut url =
			base.join(self.path.trim_start_matches('/')).map_err(crate::error::ConfigError::from)?;

		if !self.query.is_empty() {
			let mut pairs = url.query_pairs_mut();

			for (name, value) in &self.query {
				pairs.append_pair(name, value);
			}
		}

		Ok(url)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn url_preserves_query_order() {
		let base = Url::parse("https://open-api.123pan.com/").unwrap();
		let descriptor = RequestDescriptor::get("api/v2/file/list")
			.with_query("parentFileId", 0)
			.with_query("limit", 100)
			.with_query_opt("searchData", Some("report"))
			.with_query_opt("lastFileId", None::<i64>);
		let url = descriptor.url(&base).unwrap();

		assert_eq!(url.path(), "/api/v2/file/list");
		assert_eq!(url.query(), Some("parentFileId=0&limit=100&searchData=report"));
	}

	#[test]
	fn leading_slash_paths_resolve_against_the_base() {
		let base = Url::parse("https://open-api.123pan.com/").unwrap();
		let descriptor = RequestDescriptor::post("/api/v1/offline/download");
		let url = descriptor.url(&base).unwrap();

		assert_eq!(url.as_str(), "https://open-api.123pan.com/api/v1/offline/download");
	}

	#[test]
	fn descriptors_default_to_authenticated() {
		assert!(RequestDescriptor::get("api/v1/user/info").requires_auth());
		assert!(!RequestDescriptor::post("api/v1/access_token").public().requires_auth());
	}
}
