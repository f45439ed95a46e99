#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::thread;

    use crossbeam_channel::bounded;
    use rotating_logger::rotation::{list_generations, next_generation_name, GenerationPattern};
    use rotating_logger::{Level, Logger, LoggerConfig, LoggerError, Message, SourceLocation};

    fn config_in(dir: &Path) -> LoggerConfig {
        LoggerConfig::default()
            .with_directory(dir)
            .with_file_name("app.log")
    }

    fn generations(dir: &Path) -> Vec<PathBuf> {
        let pattern = GenerationPattern::new("app.log").unwrap();
        list_generations(dir, &pattern).unwrap()
    }

    /// Every line of every generation, oldest file first.
    fn all_lines(dir: &Path) -> Vec<String> {
        generations(dir)
            .iter()
            .flat_map(|path| {
                fs::read_to_string(path)
                    .unwrap()
                    .lines()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn message_of(line: &str) -> &str {
        // `[pid:tid] `, `[LEVEL] ` and `[file:line] ` precede the message.
        line.splitn(4, "] ").nth(3).unwrap()
    }

    #[test]
    fn test_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path())).unwrap();

        logger.log(
            Level::Warning,
            SourceLocation::new("src/net.rs", 88),
            Message::Template("retry {} of {}", &[&2, &5]),
        );
        logger.shutdown().unwrap();

        let lines = all_lines(dir.path());
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        let pid = format!("[{}:", std::process::id());
        assert!(line.contains(&pid), "{}", line);
        assert!(line.contains("] [WARNING] [src/net.rs:88] retry 2 of 5"), "{}", line);

        // YYYY-MM-DD HH:MM:SS.mmm
        let stamp = &line[..23];
        assert_eq!(stamp.len(), 23);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[19..20], ".");
        assert!(stamp[20..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_level_methods_capture_call_site() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path())).unwrap();

        let expected_line = line!() + 1;
        logger.info("a={}, b={}", &[&1, &2.5]);
        rotating_logger::error!(logger, "code {}", 7);
        logger.shutdown().unwrap();

        let lines = all_lines(dir.path());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(&format!("[INFO] [{}:{}] a=1, b=2.5", file!(), expected_line)), "{}", lines[0]);
        assert!(lines[1].contains("[ERROR]"));
        assert!(lines[1].contains(file!()));
        assert_eq!(message_of(&lines[1]), "code 7");
    }

    #[test]
    fn test_template_edge_cases_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path())).unwrap();

        logger.info("a={}, b={}", &[&1]);
        logger.info("a={}", &[&1, &2]);
        logger.log(
            Level::Info,
            SourceLocation::caller(),
            Message::Plain(&[&"x=", &10, &", y=", &20]),
        );
        logger.shutdown().unwrap();

        let messages: Vec<String> = all_lines(dir.path()).iter().map(|l| message_of(l).to_string()).collect();
        assert_eq!(messages, vec!["a=1, b={}", "a=1", "x=10, y=20"]);
    }

    #[test]
    fn test_no_loss_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path())).unwrap();

        for i in 0..5_000 {
            logger.debug("record {}", &[&i]);
        }
        logger.shutdown().unwrap();

        let lines = all_lines(dir.path());
        assert_eq!(lines.len(), 5_000);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(message_of(line), format!("record {}", i));
        }
    }

    #[test]
    fn test_drop_drains_queue() {
        let dir = tempfile::tempdir().unwrap();
        {
            let logger = Logger::new(config_in(dir.path())).unwrap();
            for i in 0..100 {
                logger.info("{}", &[&i]);
            }
        }
        assert_eq!(all_lines(dir.path()).len(), 100);
    }

    #[test]
    fn test_flush_makes_records_visible() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path())).unwrap();

        logger.info("before flush", &[]);
        assert!(logger.flush());
        assert_eq!(all_lines(dir.path()).len(), 1);

        logger.shutdown().unwrap();
        assert!(!logger.flush());
    }

    #[test]
    fn test_level_filtering_skips_the_queue() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path()).with_level(Level::Warning)).unwrap();

        logger.debug("hidden", &[]);
        logger.info("hidden", &[]);
        assert_eq!(logger.submitted(), 0);

        logger.warning("shown", &[]);
        logger.error("shown", &[]);
        assert_eq!(logger.submitted(), 2);

        logger.set_level(Level::Debug);
        assert_eq!(logger.level(), Level::Debug);
        logger.debug("now shown", &[]);
        assert_eq!(logger.submitted(), 3);

        logger.shutdown().unwrap();
        let lines = all_lines(dir.path());
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| !l.ends_with("hidden")));
    }

    #[test]
    fn test_size_rotation_never_exceeds_cap() {
        let dir = tempfile::tempdir().unwrap();
        let max_size = 512;
        let logger = Logger::new(config_in(dir.path()).with_max_file_size(max_size).with_max_files(1_000)).unwrap();

        for i in 0..200 {
            logger.info("payload {}", &[&i]);
        }
        logger.shutdown().unwrap();

        let files = generations(dir.path());
        assert!(files.len() > 1, "expected rotation, got {:?}", files);
        for file in &files {
            let size = fs::metadata(file).unwrap().len();
            assert!(size <= max_size, "{} is {} bytes", file.display(), size);
            assert!(size > 0);
        }

        let lines = all_lines(dir.path());
        assert_eq!(lines.len(), 200);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(message_of(line), format!("payload {}", i));
        }
    }

    #[test]
    fn test_oversized_message_gets_its_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path()).with_max_file_size(64)).unwrap();

        let big = "x".repeat(200);
        logger.info("small", &[]);
        logger.info("{}", &[&big]);
        logger.info("small again", &[]);
        logger.shutdown().unwrap();

        let files = generations(dir.path());
        assert_eq!(files.len(), 3);
        assert!(fs::read_to_string(&files[1]).unwrap().trim_end().ends_with(&big));
    }

    #[test]
    fn test_retention_keeps_most_recent_generations() {
        let dir = tempfile::tempdir().unwrap();
        let max_files = 3;
        let logger = Logger::new(config_in(dir.path()).with_max_file_size(256).with_max_files(max_files)).unwrap();

        let total = 100;
        for i in 0..total {
            logger.info("entry {}", &[&i]);
        }
        logger.shutdown().unwrap();

        // Rotated generations plus the file that was active at shutdown.
        assert_eq!(generations(dir.path()).len(), max_files + 1);

        let numbers: Vec<usize> = all_lines(dir.path())
            .iter()
            .map(|l| message_of(l).trim_start_matches("entry ").parse().unwrap())
            .collect();
        assert_eq!(*numbers.last().unwrap(), total - 1);
        assert!(numbers[0] > 0, "oldest generation should have been deleted");
        for pair in numbers.windows(2) {
            assert_eq!(pair[1], pair[0] + 1, "kept files are not contiguous");
        }
    }

    #[test]
    fn test_startup_prunes_and_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let old_stamp = chrono::Local::now() - chrono::Duration::days(1);
        let old: Vec<PathBuf> = (0..5)
            .map(|i| {
                let name = next_generation_name("app.log", &(old_stamp + chrono::Duration::milliseconds(i)));
                let path = dir.path().join(name);
                fs::write(&path, "old\n").unwrap();
                path
            })
            .collect();

        let logger = Logger::new(config_in(dir.path()).with_max_files(2)).unwrap();
        let fresh = logger.initial_file().to_path_buf();
        logger.info("new run", &[]);
        logger.shutdown().unwrap();

        let files = generations(dir.path());
        assert_eq!(files, vec![old[3].clone(), old[4].clone(), fresh.clone()]);
        assert_eq!(fs::read_to_string(&old[4]).unwrap(), "old\n");
        assert!(fs::read_to_string(&fresh).unwrap().ends_with("new run\n"));
    }

    #[test]
    fn test_ordering_with_external_synchronization() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Arc::new(Logger::new(config_in(dir.path())).unwrap());
        let (turn_tx, turn_rx) = bounded::<usize>(0);

        let producer = {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let step = turn_rx.recv().unwrap();
                    assert_eq!(step, i);
                    logger.info("B {}", &[&i]);
                }
            })
        };
        for i in 0..50 {
            logger.info("A {}", &[&i]);
            turn_tx.send(i).unwrap();
        }
        producer.join().unwrap();
        logger.shutdown().unwrap();

        let messages: Vec<String> = all_lines(dir.path()).iter().map(|l| message_of(l).to_string()).collect();
        for i in 0..50 {
            let a = messages.iter().position(|m| *m == format!("A {}", i)).unwrap();
            let b = messages.iter().position(|m| *m == format!("B {}", i)).unwrap();
            assert!(a < b, "A {} written after B {}", i, i);
        }
    }

    #[test]
    fn test_concurrent_producers() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Arc::new(Logger::new(config_in(dir.path()).with_max_file_size(4 * 1024).with_max_files(10_000)).unwrap());
        let threads = 8;
        let per_thread = 500;

        let producers: Vec<_> = (0..threads)
            .map(|t| {
                let logger = logger.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        rotating_logger::info!(logger, "producer {} record {}", t, i);
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        logger.shutdown().unwrap();

        let lines = all_lines(dir.path());
        assert_eq!(lines.len(), threads * per_thread);

        let mut next = vec![0usize; threads];
        for line in &lines {
            let message = message_of(line);
            let mut parts = message.split(' ');
            assert_eq!(parts.next(), Some("producer"), "corrupted line: {}", line);
            let t: usize = parts.next().unwrap().parse().unwrap();
            assert_eq!(parts.next(), Some("record"), "corrupted line: {}", line);
            let i: usize = parts.next().unwrap().parse().unwrap();
            assert_eq!(i, next[t], "producer {} out of order", t);
            next[t] += 1;
        }
        assert!(next.iter().all(|&n| n == per_thread));
    }

    #[test]
    fn test_rotation_failure_stops_writer() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let logger = Logger::new(config_in(&logs).with_max_file_size(100)).unwrap();

        logger.info("{}", &[&"x".repeat(60)]);
        assert!(logger.flush());
        assert!(logger.is_writer_alive());

        fs::remove_dir_all(&logs).unwrap();
        logger.info("{}", &[&"y".repeat(60)]);
        assert!(!logger.flush());

        // Producers keep going without errors or blocking.
        logger.info("after failure", &[]);
        assert!(matches!(logger.shutdown(), Err(LoggerError::OpenFile { .. })));
        assert!(!logger.is_writer_alive());
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Logger::new(config_in(dir.path()).with_file_name("nested/app.log")),
            Err(LoggerError::InvalidConfig(_))
        ));
        assert!(matches!(
            Logger::new(config_in(dir.path()).with_max_file_size(0)),
            Err(LoggerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_file_name_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path()).with_file_name("")).unwrap();
        assert_eq!(logger.file_name(), "log.txt");
        logger.info("default name", &[]);
        logger.shutdown().unwrap();

        let pattern = GenerationPattern::new("log.txt").unwrap();
        let files = list_generations(dir.path(), &pattern).unwrap();
        assert_eq!(files, vec![logger.initial_file().to_path_buf()]);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("log_") && name.ends_with(".txt"), "{}", name);
        assert!(fs::read_to_string(&files[0]).unwrap().ends_with("default name\n"));
    }

    #[test]
    fn test_plain_mode_macros() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path())).unwrap();
        rotating_logger::info!(logger; "x=", 10, ", y=", 20);
        rotating_logger::error!(logger; "no {} substitution ", 1.5);
        rotating_logger::warning!(logger, "x={}, y={}", 10, 20);
        logger.shutdown().unwrap();

        let lines = all_lines(dir.path());
        let messages: Vec<&str> = lines.iter().map(|line| message_of(line)).collect();
        assert_eq!(messages, vec!["x=10, y=20", "no {} substitution 1.5", "x=10, y=20"]);
        assert!(lines[0].contains("[INFO]"));
        assert!(lines[1].contains("[ERROR]"));
        assert!(lines[2].contains("[WARNING]"));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::new(config_in(dir.path())).unwrap();
        assert!(logger.shutdown().is_ok());
        assert!(logger.shutdown().is_ok());
        logger.info("ignored", &[]);
        assert!(!logger.is_writer_alive());
    }
}
