#[cfg(test)]
mod tests {
    use std::fs;

    use beads_task::core::config::Config;
    use beads_task::design::bank::SequenceBank;
    use beads_task::logger::{EventSink, SessionEvent};
    use beads_task::present::AbortToken;
    use beads_task::present::scripted::{ScriptedCall, ScriptedPresentation};
    use beads_task::session::{Session, SessionStatus, Stage, SubjectId, run_session};
    use beads_task::trial::TrialPhase;

    fn config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.design.seed = Some(17);
        config.paths.output_dir = dir.to_path_buf();
        config
    }

    fn session(config: &Config) -> Session {
        Session::new(
            SubjectId::parse("S09").unwrap(),
            &config.design,
            &SequenceBank::reference(),
        )
        .unwrap()
    }

    #[test]
    fn abort_mid_trial_exports_only_committed_trials() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut session = session(&config);
        // Practice (4 trials) plus five main trials, then three ratings into the sixth.
        let ratings = (4 + 5) * 9 + 3;
        let mut presenter = ScriptedPresentation::new(AbortToken::new()).with_abort_after(ratings);
        let mut events: Vec<SessionEvent> = Vec::new();

        let report = run_session(&mut session, &mut presenter, &mut events, &config).unwrap();

        assert_eq!(
            report.status,
            SessionStatus::Aborted {
                stage: Stage::Main,
                phase: Some(TrialPhase::BeadStep(3)),
            }
        );
        assert_eq!(report.flush.trials, 5);
        assert_eq!(report.flush.rows, 45);
        assert_eq!(session.results().len(), 5);

        let csv = fs::read_to_string(&report.flush.path).unwrap();
        let rows: Vec<&str> = csv.split("\r\n").skip(1).filter(|l| !l.is_empty()).collect();
        assert_eq!(rows.len(), 45);
        assert!(rows.iter().all(|r| !r.starts_with("S09,6,")));

        let flushed = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::ResultsFlushed { .. }))
            .count();
        assert_eq!(flushed, 1, "results flush exactly once");
        assert!(events.iter().any(|e| e.name() == "session_aborted"));
        assert!(!events.iter().any(|e| e.name() == "session_completed"));
        assert_eq!(events.dropped(), 0);
    }

    #[test]
    fn abort_skips_farewell_and_choice() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut session = session(&config);
        let mut presenter = ScriptedPresentation::new(AbortToken::new()).with_abort_after(40);
        let mut events: Vec<SessionEvent> = Vec::new();
        run_session(&mut session, &mut presenter, &mut events, &config).unwrap();

        let trace = presenter.trace();
        assert_eq!(trace.last(), Some(&ScriptedCall::Aborted));
        assert!(!trace.iter().any(|c| matches!(
            c,
            ScriptedCall::Notice(beads_task::present::Notice::Farewell)
        )));
    }

    #[test]
    fn second_flush_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut session = session(&config);
        let mut presenter = ScriptedPresentation::new(AbortToken::new()).with_abort_after(0);
        let mut events: Vec<SessionEvent> = Vec::new();
        let report = run_session(&mut session, &mut presenter, &mut events, &config).unwrap();
        assert!(session.is_flushed());
        let err = session.flush(&report.flush.path).unwrap_err();
        assert_eq!(err.code(), "BDS-2002");
    }
}
