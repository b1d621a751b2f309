mod mock;
mod native;

pub use self::mock::{MockEngine, MockResponse, MockResponseBuilder, RecordedQuery};
pub use self::native::NativeEngine;
