//
// path_resolve.rs
//
// Normalizes a document-location identifier (editor scheme string or plain
// path) into a canonical filesystem path.
//

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use percent_encoding::percent_decode_str;

const FILE_SCHEME: &str = "file://";

/// Resolve an opaque document location to a filesystem path.
///
/// `file://` locations are percent-decoded; malformed encodings are an
/// error that propagates to the caller rather than silently falling back.
/// Plain relative paths resolve against the process working directory.
pub fn resolve(location: &str) -> Result<PathBuf> {
    if let Some(rest) = location.strip_prefix(FILE_SCHEME) {
        let decoded = decode_location(rest)
            .with_context(|| format!("cannot decode document location '{location}'"))?;
        return Ok(PathBuf::from(strip_drive_slash(decoded)));
    }

    let path = PathBuf::from(location);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = env::current_dir().context("cannot determine working directory")?;
    Ok(cwd.join(path))
}

fn decode_location(raw: &str) -> Result<String> {
    validate_escapes(raw)?;
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .context("decoded location is not valid UTF-8")?;
    Ok(decoded.into_owned())
}

/// Every `%` must introduce a two-hex-digit escape.
fn validate_escapes(raw: &str) -> Result<()> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                bail!("malformed percent-encoding at byte {i}");
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// File URLs encode Windows drive paths as `/C:/...`; the leading
/// separator is not part of the path.
fn strip_drive_slash(path: String) -> String {
    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':' {
        path[1..].to_string()
    } else {
        path
    }
}
