use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::diagram::Diagram;
use crate::generation::GenerationMap;

pub fn write_diagram(diagram: &Diagram, output: Option<&Path>) -> anyhow::Result<()> {
    write_json(diagram, output)
}

pub fn write_generations(generations: &GenerationMap, output: Option<&Path>) -> anyhow::Result<()> {
    write_json(generations, output)
}

/// Pretty JSON to `output`, or stdout when it is `None` or `-`.
pub fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        _ => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}
