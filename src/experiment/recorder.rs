use log::debug;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::sampler::SearchSpace;
use super::schema::{CheckpointRecord, ParamInfo};
use crate::error::Result;

pub const INPUT_FILE: &str = "input.txt";
pub const PARAM_INFO_FILE: &str = "paramInfo.txt";
pub const INDEX_FILE: &str = "index.txt";
pub const SEARCH_SPACE_FILE: &str = "searchSpace.json";
pub const IMAGES_DIR: &str = "images";
pub const RUNS_DIR: &str = "runs";

/// How predicted labels are written to the per-checkpoint dumps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LabelEncoding {
    #[default]
    ZeroOne,
    /// 0 is written as -1
    NegPos,
}

impl LabelEncoding {
    fn encode(&self, label: u8) -> i8 {
        match (self, label) {
            (LabelEncoding::NegPos, 0) => -1,
            _ => label as i8,
        }
    }
}

/// Create a directory and its parents, optionally wiping whatever was there first
pub fn create_dir(path: &Path, clean: bool) -> Result<()> {
    if clean {
        match fs::remove_dir_all(path) {
            Ok(()) => debug!("cleaned {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    fs::create_dir_all(path)?;

    Ok(())
}

/// Writes the on-disk layout of one run-group:
/// `paramInfo.txt`, `index.txt`, `images/<row>.png` and `runs/<row>.txt`
pub struct RunRecorder {
    group_dir: PathBuf,
    index: csv::Writer<File>,
    num_columns: usize,
    encoding: LabelEncoding,
}

impl RunRecorder {
    /// Write the schema files and index header into an already provisioned group directory,
    /// and provision clean image and prediction directories.
    pub fn create(
        group_dir: &Path,
        columns: &[ParamInfo],
        space: &SearchSpace,
        encoding: LabelEncoding,
    ) -> Result<RunRecorder> {
        let mut param_info = tsv_writer(File::create(group_dir.join(PARAM_INFO_FILE))?);
        for column in columns {
            param_info.serialize(column)?;
        }
        param_info.flush()?;

        let mut search_space = File::create(group_dir.join(SEARCH_SPACE_FILE))?;
        search_space.write_all(space.to_json().pretty(2).as_bytes())?;

        let mut index = tsv_writer(File::create(group_dir.join(INDEX_FILE))?);
        index.write_record(columns.iter().map(|c| c.name.as_str()))?;
        index.flush()?;

        create_dir(&group_dir.join(IMAGES_DIR), true)?;
        create_dir(&group_dir.join(RUNS_DIR), true)?;
        debug!("provisioned {}", group_dir.display());

        Ok(RunRecorder {
            group_dir: group_dir.to_path_buf(),
            index,
            num_columns: columns.len(),
            encoding,
        })
    }

    /// Image path for a row, as recorded in the index
    pub fn image_name(row_index: usize) -> String {
        format!("{IMAGES_DIR}/{row_index}.png")
    }

    pub fn image_path(&self, row_index: usize) -> PathBuf {
        self.group_dir.join(Self::image_name(row_index))
    }

    pub fn predictions_path(&self, row_index: usize) -> PathBuf {
        self.group_dir.join(RUNS_DIR).join(format!("{row_index}.txt"))
    }

    /// Append the index row of a checkpoint and dump its predictions.
    /// The index is flushed so that completed rows survive an interrupted run.
    pub fn record(
        &mut self,
        record: &CheckpointRecord,
        space: &SearchSpace,
        predictions: &[u8],
    ) -> Result<()> {
        let row = record.to_row(space);
        debug_assert_eq!(row.len(), self.num_columns);
        self.index.write_record(&row)?;
        self.index.flush()?;

        let path = self.predictions_path(record.row_index);
        let mut file = BufWriter::new(File::create(&path)?);
        writeln!(file, "label_pred")?;
        for label in predictions {
            writeln!(file, "{}", self.encoding.encode(*label))?;
        }
        file.flush()?;
        debug!("wrote {}", path.display());

        Ok(())
    }
}

fn tsv_writer(file: File) -> csv::Writer<File> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(file)
}
