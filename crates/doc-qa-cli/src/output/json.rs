//! JSON output adapter.

use anyhow::Result;
use doc_qa_core::{AnalysisRecord, ResultOutput};
use std::io::Write;
use std::sync::Mutex;

/// JSON output adapter.
///
/// In lines mode every record is written as it arrives. In array mode
/// records are buffered and the array is written on the first `flush()`.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    /// Pending array records; `None` in lines mode or once emitted.
    pending: Mutex<Option<Vec<AnalysisRecord>>>,
    pretty: bool,
}

impl JsonOutput {
    /// JSON Lines: one compact object per line.
    #[must_use]
    pub fn lines(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            pending: Mutex::new(None),
            pretty: false,
        }
    }

    /// A single JSON array, optionally pretty-printed.
    #[must_use]
    pub fn array(writer: Box<dyn Write + Send>, pretty: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            pending: Mutex::new(Some(Vec::new())),
            pretty,
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, line: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{line}")?;
        Ok(())
    }

    fn take_pending(&self) -> Result<Option<Vec<AnalysisRecord>>> {
        Ok(self
            .pending
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
            .take())
    }
}

impl ResultOutput for JsonOutput {
    fn write(&self, record: &AnalysisRecord) -> Result<()> {
        {
            let mut pending = self
                .pending
                .lock()
                .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
            if let Some(records) = pending.as_mut() {
                records.push(record.clone());
                return Ok(());
            }
        }
        self.write_line(&serde_json::to_string(record)?)
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        if let Some(records) = self.take_pending()? {
            let json = if self.pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            self.write_line(&json)?;
        }

        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}
