use anyhow::Context;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const JOB_HEADER: &str = "timestamp,board_size,worker_count,worker_id,job_id,send_time_ns,receive_time_ns,job_time_ns,boards_evaluated,nodes_pruned,est_max_depth_pruned,max_depth_reached,entire_space";

pub const RUN_HEADER: &str = "timestamp,board_size,worker_count,jobs,total_time_ns,boards_evaluated,nodes_pruned,est_max_depth_pruned,max_depth_reached,entire_space,boards_min,boards_max,boards_std_dev,job_time_min_ns,job_time_max_ns,job_time_std_dev_ns,worker_time_min_ns,worker_time_max_ns,worker_time_std_dev_ns";

pub const STATIC_HEADER: &str = "timestamp,board_size,worker_count,evaluations,total_time_ns,comm_time_ns,comp_time_ns,boards_evaluated,max_depth_reached,entire_space";

/// Append `row` to the log at `path`, writing `header` first if the file is
/// new or empty.
pub fn append_row(path: &Path, header: &str, row: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let empty = file.metadata().map(|m| m.len() == 0).unwrap_or(true);
    if empty {
        writeln!(file, "{}", header)?;
    }
    writeln!(file, "{}", row)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_written_once() {
        let name = format!("othello_search_log_{}.csv", std::process::id());
        let path = std::env::temp_dir().join(name);
        let _ = std::fs::remove_file(&path);

        append_row(&path, "a,b", "1,2").unwrap();
        append_row(&path, "a,b", "3,4").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "a,b\n1,2\n3,4\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = std::env::temp_dir().join("othello_search_missing_dir_xyz").join("nested");
        assert!(append_row(&dir.join("log.csv"), "a", "1").is_err());
    }
}
