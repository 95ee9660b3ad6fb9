use core::str::FromStr;

use fellowship_core::DomainError;

use crate::app::errors::ApiResult;

/// Parse a path id. Call only after authorization: a malformed id is a 404.
pub fn parse_id<T>(raw: &str) -> ApiResult<T>
where
    T: FromStr<Err = DomainError>,
{
    Ok(raw.parse()?)
}
