#[cfg(test)]
mod tests {
    use crate::battle::runner::NextInput;
    use crate::battle::state::{Phase, Side};
    use crate::battle::tests::common::{
        ai_runner, assert_ok, definitions, hot_seat_runner, last_log_line, TestCreatureBuilder,
    };
    use crate::errors::{BattleEngineError, DataFormatError, IllegalActionError, InvalidTeamError};
    use pretty_assertions::assert_eq;
    use schema::{CreatureDefinition, PokemonType};
    use std::sync::{Arc, Mutex};

    fn team(names: &[&str]) -> Vec<CreatureDefinition> {
        let builders: Vec<TestCreatureBuilder> = names
            .iter()
            .map(|name| TestCreatureBuilder::new(name, PokemonType::Normal))
            .collect();
        definitions(&builders)
    }

    fn no_session() -> Result<(), BattleEngineError> {
        Err(BattleEngineError::Action(IllegalActionError::NoSession))
    }

    #[test]
    fn test_initialize_starts_with_side_a() {
        let mut runner = hot_seat_runner(Vec::new());
        assert_eq!(runner.next_input(), NextInput::NoBattle);

        assert_ok(runner.initialize(&team(&["Eevee", "Ditto"]), &team(&["Snorlax"])));

        let session = runner.session().unwrap();
        assert_eq!(session.phase, Phase::Ongoing);
        assert_eq!(session.turn_owner, Side::A);
        assert_eq!(session.turn_number, 1);
        assert_eq!(session.active, [0, 0]);
        assert_eq!(session.log, vec!["Battle begins!".to_string()]);
        assert!(session.teams.iter().flatten().all(|c| c.current_hp == c.max_hp));
        assert_eq!(runner.next_input(), NextInput::SelectAction(Side::A));
        assert_eq!(runner.generation(), 1);
    }

    #[test]
    fn test_empty_team_is_rejected() {
        let mut runner = hot_seat_runner(Vec::new());

        assert_eq!(
            runner.initialize(&team(&["Eevee"]), &[]),
            Err(BattleEngineError::Team(InvalidTeamError::Empty(Side::B)))
        );
        assert!(runner.session().is_none());
        assert_eq!(runner.generation(), 0);
    }

    #[test]
    fn test_oversized_team_is_rejected() {
        let mut runner = hot_seat_runner(Vec::new());

        assert_eq!(
            runner.initialize(&team(&["A", "B", "C", "D"]), &team(&["E"])),
            Err(BattleEngineError::Team(InvalidTeamError::TooLarge {
                side: Side::A,
                size: 4,
                max: 3,
            }))
        );
    }

    #[test]
    fn test_malformed_creature_is_rejected() {
        let broken = definitions(&[TestCreatureBuilder::new("Ghost", PokemonType::Ghost).with_max_hp(0)]);
        let mut runner = hot_seat_runner(Vec::new());

        assert_eq!(
            runner.initialize(&team(&["Eevee"]), &broken),
            Err(BattleEngineError::Data(DataFormatError::invalid(
                "Ghost.base_stats.hp",
                "must be greater than 0"
            )))
        );
    }

    #[test]
    fn test_duplicate_ids_within_a_team_are_rejected() {
        let twins = definitions(&[
            TestCreatureBuilder::new("Ratta", PokemonType::Normal).with_id("dup"),
            TestCreatureBuilder::new("Rattb", PokemonType::Normal).with_id("dup"),
        ]);
        let mut runner = ai_runner(Vec::new());

        assert_eq!(
            runner.initialize(&team(&["Eevee"]), &twins),
            Err(BattleEngineError::Data(DataFormatError::DuplicateId("dup".to_string())))
        );
        assert!(runner.session().is_none());
        assert_eq!(runner.generation(), 0);
    }

    #[test]
    fn test_same_id_on_opposing_teams_is_allowed() {
        let mut runner = hot_seat_runner(Vec::new());

        assert_ok(runner.initialize(&team(&["Eevee"]), &team(&["Eevee"])));
        assert_eq!(runner.next_input(), NextInput::SelectAction(Side::A));
    }

    #[test]
    fn test_failed_initialize_keeps_running_battle() {
        let mut runner = hot_seat_runner(vec![50; 3]);
        assert_ok(runner.initialize(&team(&["Eevee"]), &team(&["Snorlax"])));
        assert_ok(runner.submit_move(0));
        let before = runner.session().unwrap().clone();

        assert!(runner.initialize(&[], &team(&["Snorlax"])).is_err());

        assert_eq!(runner.session(), Some(&before));
        assert_eq!(runner.generation(), 1);
    }

    #[test]
    fn test_reset_then_initialize_matches_fresh_battle() {
        let team_a = team(&["Eevee", "Ditto"]);
        let team_b = team(&["Snorlax"]);
        let mut runner = hot_seat_runner(vec![50; 3]);
        assert_ok(runner.initialize(&team_a, &team_b));
        assert_ok(runner.submit_move(0));

        runner.reset_session();
        assert!(runner.session().is_none());
        assert_eq!(runner.next_input(), NextInput::NoBattle);
        assert_ok(runner.initialize(&team_a, &team_b));

        let mut fresh = hot_seat_runner(Vec::new());
        assert_ok(fresh.initialize(&team_a, &team_b));
        assert_eq!(runner.session(), fresh.session());
        assert_eq!(runner.generation(), 3);
    }

    #[test]
    fn test_commands_without_a_battle() {
        let mut runner = ai_runner(Vec::new());

        assert_eq!(runner.submit_move(0), no_session());
        assert_eq!(runner.submit_switch("eevee"), no_session());
        assert_eq!(runner.step_ai(), Err(BattleEngineError::Action(IllegalActionError::NoSession)));
        assert_eq!(runner.next_input(), NextInput::NoBattle);
    }

    #[test]
    fn test_finished_battle_rejects_actions() {
        let attacker = TestCreatureBuilder::new("Eevee", PokemonType::Normal);
        let defender = TestCreatureBuilder::new("Magikarp", PokemonType::Water).with_max_hp(1);
        let mut runner = hot_seat_runner(vec![50; 3]);
        assert_ok(runner.initialize(&definitions(&[attacker]), &definitions(&[defender])));
        assert_ok(runner.submit_move(0));
        assert_eq!(runner.next_input(), NextInput::BattleOver(Side::A));
        let log_length = runner.session().unwrap().log.len();

        assert_eq!(
            runner.submit_move(0),
            Err(BattleEngineError::Action(IllegalActionError::BattleFinished))
        );

        let session = runner.session().unwrap();
        assert_eq!(session.log.len(), log_length + 1);
        assert!(last_log_line(session).ends_with("the battle is already over"));
        assert_eq!(session.phase, Phase::Finished(Side::A));
    }

    #[test]
    fn test_listeners_see_every_change() {
        let seen: Arc<Mutex<Vec<Option<u32>>>> = Arc::new(Mutex::new(Vec::new()));
        let mut runner = hot_seat_runner(vec![50; 3]);
        let sink = Arc::clone(&seen);
        runner.on_state_changed(move |session| {
            sink.lock().unwrap().push(session.map(|s| s.turn_number));
        });

        assert_ok(runner.initialize(&team(&["Eevee"]), &team(&["Snorlax"])));
        assert_ok(runner.submit_move(0));
        assert!(runner.submit_move(9).is_err());
        runner.reset_session();

        assert_eq!(*seen.lock().unwrap(), vec![Some(1), Some(2), Some(2), None]);
    }
}
