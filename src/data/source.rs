use super::error::LoadError;

/// Download the workbook at `url`. Any non-2xx status is an error; there is
/// no retry.
pub fn fetch_workbook(url: &str) -> Result<Vec<u8>, LoadError> {
    log::info!("Fetching workbook from {url}");
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let bytes = response.bytes()?;
    log::info!("Fetched {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_url_is_a_fetch_error() {
        let err = fetch_workbook("not a url").unwrap_err();
        assert!(matches!(err, LoadError::Fetch(_)));
    }
}
