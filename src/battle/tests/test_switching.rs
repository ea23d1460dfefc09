#[cfg(test)]
mod tests {
    use crate::battle::engine::{execute_action, validate_action, PlayerAction};
    use crate::battle::runner::NextInput;
    use crate::battle::state::{EventBus, Phase, Side};
    use crate::battle::tests::common::{
        assert_ok, custom_move, definitions, hot_seat_runner, last_log_line, log_contains, predictable_rng,
        ready_session, TestCreatureBuilder,
    };
    use crate::errors::{BattleEngineError, IllegalActionError};
    use pretty_assertions::assert_eq;
    use schema::{MoveCategory, PokemonType};

    fn p1() -> TestCreatureBuilder {
        TestCreatureBuilder::new("Bulbasaur", PokemonType::Grass).with_id("p1")
    }

    fn p2() -> TestCreatureBuilder {
        TestCreatureBuilder::new("Ivysaur", PokemonType::Grass).with_id("p2")
    }

    fn rattata() -> TestCreatureBuilder {
        TestCreatureBuilder::new("Rattata", PokemonType::Normal).with_id("q1")
    }

    fn raticate() -> TestCreatureBuilder {
        TestCreatureBuilder::new("Raticate", PokemonType::Normal).with_id("q2")
    }

    fn head_smash() -> schema::MoveDefinition {
        let mut definition = custom_move("Head Smash", MoveCategory::Physical, PokemonType::Rock, 100);
        definition.recoil_fraction = 0.5;
        definition
    }

    fn runner_error(error: IllegalActionError) -> Result<(), BattleEngineError> {
        Err(BattleEngineError::Action(error))
    }

    #[test]
    fn test_forced_switch_does_not_grant_extra_turn() {
        // Arrange: Player 1's lead is one hit from fainting
        let team_a = definitions(&[p1().with_moves(&["Growl"]), p2()]);
        let team_b = definitions(&[rattata().with_moves(&["Tackle"])]);
        let mut runner = hot_seat_runner(vec![50; 4]);
        assert_ok(runner.initialize(&team_a, &team_b));
        runner.session_mut().unwrap().teams[0][0].current_hp = 1;

        // Act: Growl, then Rattata knocks Bulbasaur out
        assert_ok(runner.submit_move(0));
        assert_ok(runner.submit_move(0));

        // Assert: Player 1 must replace and nothing else is allowed
        let session = runner.session().unwrap();
        assert_eq!(session.phase, Phase::AwaitingSwitch(Side::A));
        assert_eq!(runner.next_input(), NextInput::SelectReplacement(Side::A));
        assert_eq!(last_log_line(session), "Player 1, choose your next Pokemon!");
        assert_eq!(runner.submit_move(0), runner_error(IllegalActionError::AwaitingSwitch(Side::A)));

        // Act: send in Ivysaur
        assert_ok(runner.submit_switch("p2"));

        // Assert: Player 1 acts next, Rattata did not move again
        let session = runner.session().unwrap();
        assert_eq!(session.phase, Phase::Ongoing);
        assert_eq!(session.active[0], 1);
        assert_eq!(runner.next_input(), NextInput::SelectAction(Side::A));
        assert_eq!(session.active(Side::A).current_hp, 100);
        assert_eq!(session.active(Side::B).moves[0].current_pp, 34);
        assert!(log_contains(session, "Player 1 switched to Ivysaur!"));
    }

    #[test]
    fn test_knocked_out_defender_replaces_then_moves() {
        let team_a = definitions(&[p1().with_moves(&["Tackle"])]);
        let team_b = definitions(&[rattata().with_max_hp(5), raticate()]);
        let mut runner = hot_seat_runner(vec![50; 3]);
        assert_ok(runner.initialize(&team_a, &team_b));

        assert_ok(runner.submit_move(0));
        assert_eq!(runner.next_input(), NextInput::SelectReplacement(Side::B));

        assert_ok(runner.submit_switch("q2"));
        assert_eq!(runner.next_input(), NextInput::SelectAction(Side::B));
        assert_eq!(runner.session().unwrap().active(Side::B).name, "Raticate");
    }

    #[test]
    fn test_voluntary_switch_uses_the_turn() {
        let team_a = definitions(&[p1(), p2()]);
        let team_b = definitions(&[rattata()]);
        let mut runner = hot_seat_runner(Vec::new());
        assert_ok(runner.initialize(&team_a, &team_b));

        assert_ok(runner.submit_switch("p2"));

        let session = runner.session().unwrap();
        assert_eq!(session.active(Side::A).name, "Ivysaur");
        assert_eq!(session.turn_owner, Side::B);
        assert_eq!(last_log_line(session), "Player 1 switched to Ivysaur!");
    }

    #[test]
    fn test_invalid_switch_targets() {
        let team_a = definitions(&[p1(), p2()]);
        let team_b = definitions(&[rattata()]);
        let mut runner = hot_seat_runner(Vec::new());
        assert_ok(runner.initialize(&team_a, &team_b));

        assert_eq!(
            runner.submit_switch("p1"),
            runner_error(IllegalActionError::TargetAlreadyActive("Bulbasaur".to_string()))
        );
        assert_eq!(
            runner.submit_switch("missingno"),
            runner_error(IllegalActionError::UnknownCreature("missingno".to_string()))
        );

        runner.session_mut().unwrap().teams[0][1].current_hp = 0;
        assert_eq!(
            runner.submit_switch("p2"),
            runner_error(IllegalActionError::TargetFainted("Ivysaur".to_string()))
        );

        let session = runner.session().unwrap();
        assert_eq!(session.active[0], 0);
        assert_eq!(session.turn_owner, Side::A);
        assert_eq!(last_log_line(session), "Player 1: Ivysaur has fainted and cannot battle");
    }

    #[test]
    fn test_only_the_fainted_side_may_act_during_replacement() {
        let mut session = ready_session(vec![p1().with_hp(0).build(), p2().build()], vec![rattata().build()]);
        session.phase = Phase::AwaitingSwitch(Side::A);

        let switch = PlayerAction::SwitchPokemon { target_id: "q1".to_string() };
        assert_eq!(
            validate_action(&session, Side::B, &switch),
            Err(IllegalActionError::AwaitingSwitch(Side::A))
        );
        assert_eq!(
            validate_action(&session, Side::A, &PlayerAction::UseMove { move_index: 0 }),
            Err(IllegalActionError::AwaitingSwitch(Side::A))
        );
        let replacement = PlayerAction::SwitchPokemon { target_id: "p2".to_string() };
        assert_eq!(validate_action(&session, Side::A, &replacement), Ok(()));
    }

    #[test]
    fn test_switching_keeps_stages_and_condition() {
        let mut lead = p1().with_condition(schema::ConditionKind::Poisoned, 0).build();
        lead.stat_stages.attack = 2;
        let mut session = ready_session(vec![lead, p2().build()], vec![rattata().build()]);
        let mut bus = EventBus::new();
        let mut rng = predictable_rng();

        let action = PlayerAction::SwitchPokemon { target_id: "p2".to_string() };
        execute_action(&mut session, Side::A, &action, &mut rng, &mut bus).unwrap();

        bus.print_debug_with_message("Events for test_switching_keeps_stages_and_condition:");
        assert_eq!(session.teams[0][0].stat_stages.attack, 2);
        assert_eq!(session.teams[0][0].condition, Some(schema::ConditionKind::Poisoned));
        assert_eq!(session.turn_owner, Side::B);
    }

    #[test]
    fn test_recoil_knockout_hands_initiative_to_defender() {
        // Arrange
        let team_a = definitions(&[p1().with_move(head_smash()), p2()]);
        let team_b = definitions(&[rattata()]);
        // crit check, jitter 0
        let mut runner = hot_seat_runner(vec![50, 3]);
        assert_ok(runner.initialize(&team_a, &team_b));
        runner.session_mut().unwrap().teams[0][0].current_hp = 10;

        // Act
        assert_ok(runner.submit_move(0));

        // Assert: 50 damage dealt, 25 recoil knocks Bulbasaur out
        let session = runner.session().unwrap();
        assert_eq!(session.active(Side::B).current_hp, 50);
        assert_eq!(session.phase, Phase::AwaitingSwitch(Side::A));

        assert_ok(runner.submit_switch("p2"));
        assert_eq!(runner.next_input(), NextInput::SelectAction(Side::B));
    }

    #[test]
    fn test_recoil_double_knockout_catches_defender_at_its_turn() {
        // Arrange: both leads go down in the same exchange
        let team_a = definitions(&[p1().with_move(head_smash()), p2()]);
        let team_b = definitions(&[rattata(), raticate()]);
        let mut runner = hot_seat_runner(vec![50, 3]);
        assert_ok(runner.initialize(&team_a, &team_b));
        {
            let session = runner.session_mut().unwrap();
            session.teams[0][0].current_hp = 10;
            session.teams[1][0].current_hp = 30;
        }

        // Act
        assert_ok(runner.submit_move(0));

        // Assert: the attacker's faint is handled first
        let session = runner.session().unwrap();
        assert_eq!(session.phase, Phase::AwaitingSwitch(Side::A));
        assert!(log_contains(session, "Bulbasaur fainted!"));
        assert!(!log_contains(session, "Rattata fainted!"));

        // Act: once Player 1 replaces, Player 2's turn start finds Rattata down
        assert_ok(runner.submit_switch("p2"));

        let session = runner.session().unwrap();
        assert!(log_contains(session, "Rattata fainted!"));
        assert_eq!(runner.next_input(), NextInput::SelectReplacement(Side::B));

        assert_ok(runner.submit_switch("q2"));
        assert_eq!(runner.next_input(), NextInput::SelectAction(Side::B));
    }
}
