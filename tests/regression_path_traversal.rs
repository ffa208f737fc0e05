#![allow(missing_docs)]

#[cfg(test)]
mod tests {
    use std::fs;

    use beads_task::core::config::Config;
    use beads_task::design::bank::SequenceBank;
    use beads_task::logger::NullLogger;
    use beads_task::present::AbortToken;
    use beads_task::present::scripted::ScriptedPresentation;
    use beads_task::session::{Session, SubjectId, run_session};

    #[test]
    fn traversal_subject_ids_are_rejected_before_any_trial() {
        for raw in [
            "../escape",
            "..",
            ".hidden",
            "a/b",
            "a\\b",
            "/abs",
            "",
            "   ",
            "nul\0byte",
        ] {
            let err = SubjectId::parse(raw).expect_err(raw);
            assert_eq!(err.code(), "BDS-1102", "{raw:?}");
        }
    }

    #[test]
    fn overlong_subject_id_is_rejected() {
        let long = "x".repeat(65);
        assert!(SubjectId::parse(&long).is_err());
        assert!(SubjectId::parse(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn results_stay_inside_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out");
        let mut config = Config::default();
        config.design.seed = Some(2);
        config.design.practice = false;
        config.paths.output_dir.clone_from(&out);

        let subject = SubjectId::parse("P-01.v2").unwrap();
        let mut session =
            Session::new(subject, &config.design, &SequenceBank::reference()).unwrap();
        let token = AbortToken::new();
        let mut presenter = ScriptedPresentation::new(token).with_abort_after(9);
        let report = run_session(&mut session, &mut presenter, &mut NullLogger, &config).unwrap();

        assert!(report.flush.path.starts_with(&out));
        let outside: Vec<_> = fs::read_dir(root.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name())
            .collect();
        assert_eq!(outside, vec![std::ffi::OsString::from("out")]);
        assert!(out.join("beads_task_results_P-01.v2.csv").exists());
    }
}
