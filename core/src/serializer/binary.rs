//! Binary serializer (spec §4.9): passes a single scalar payload through.

use std::io::{Read, Write};

use tracing::warn;

use crate::error::Result;
use crate::option::Config;
use crate::result::{Payload, ResultSet};

pub fn serialize(result: &mut ResultSet, out: &mut dyn Write, _cfg: &Config) -> Result<()> {
    match result.payload() {
        None => {
            // Open question (a) in spec §8: the source conflates "null
            // result" with "empty result" here; preserved as-is rather than
            // distinguishing the two cases.
            warn!("binary serializer: no payload to write");
            Ok(())
        }
        Some(Payload::Bytes(bytes)) => {
            out.write_all(bytes)?;
            Ok(())
        }
        Some(Payload::Text(text)) => {
            out.write_all(text.as_bytes())?;
            Ok(())
        }
        Some(Payload::Stream(stream)) => {
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf)?;
            out.write_all(&buf)?;
            Ok(())
        }
    }
}
