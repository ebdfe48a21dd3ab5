use thiserror::Error;

use crate::textproto::{DescriptorPool, FieldDescriptor, MessageDescriptor};

/// Lookup failure distinct from "not found".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
	/// Type URL has no message name after its last `/`.
	#[error("invalid type URL {url:?}")]
	InvalidUrl {
		/// URL as given.
		url: String,
	},
	/// Resolver-specific failure.
	#[error("{0}")]
	Other(String),
}

/// Answers which extension or message type a name or type URL denotes.
///
/// `Ok(None)` means not found. Implementations must tolerate concurrent reads.
pub trait TypeResolver: Sync {
	/// Find an extension field by full name.
	fn find_extension_by_name(&self, full_name: &str) -> Result<Option<FieldDescriptor>, ResolveError>;

	/// Find a message type by `google.protobuf.Any` type URL.
	fn find_message_by_url(&self, url: &str) -> Result<Option<MessageDescriptor>, ResolveError>;
}

impl TypeResolver for DescriptorPool {
	fn find_extension_by_name(&self, full_name: &str) -> Result<Option<FieldDescriptor>, ResolveError> {
		Ok(self.extension_by_name(full_name))
	}

	fn find_message_by_url(&self, url: &str) -> Result<Option<MessageDescriptor>, ResolveError> {
		let name = url.rsplit_once('/').map_or(url, |(_, name)| name);
		if name.is_empty() {
			return Err(ResolveError::InvalidUrl { url: url.to_owned() });
		}
		Ok(self.message_by_name(name))
	}
}

#[cfg(test)]
mod tests {
	use super::{ResolveError, TypeResolver};
	use crate::textproto::{DescriptorPool, MessageBuilder, ScalarType};

	#[test]
	fn pool_resolves_urls_by_last_segment() {
		let pool = DescriptorPool::builder()
			.message(MessageBuilder::new("pkg.Foo").field("bar", 1, ScalarType::Int32))
			.build()
			.expect("pool builds");

		let found = pool.find_message_by_url("type.googleapis.com/pkg.Foo").expect("lookup succeeds");
		assert_eq!(found.map(|message| message.full_name().to_owned()), Some("pkg.Foo".to_owned()));
		assert!(pool.find_message_by_url("pkg.Foo").expect("bare names work").is_some());
		assert!(pool.find_message_by_url("example.com/pkg.Bar").expect("lookup succeeds").is_none());
		assert_eq!(
			pool.find_message_by_url("example.com/"),
			Err(ResolveError::InvalidUrl {
				url: "example.com/".to_owned()
			})
		);
	}
}
