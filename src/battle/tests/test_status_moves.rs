#[cfg(test)]
mod tests {
    use crate::battle::combatant::Combatant;
    use crate::battle::engine::{execute_action, PlayerAction};
    use crate::battle::state::{BattleEvent, BattleSession, EventBus, Side, TurnRng};
    use crate::battle::tests::common::{custom_move, ready_session, TestCreatureBuilder};
    use pretty_assertions::assert_eq;
    use schema::{ConditionKind, MoveCategory, PokemonType, StatType, Target};

    fn use_first_move(session: &mut BattleSession, outcomes: Vec<u8>) -> EventBus {
        let mut rng = TurnRng::new_for_test(outcomes);
        let mut bus = EventBus::new();
        execute_action(session, Side::A, &PlayerAction::UseMove { move_index: 0 }, &mut rng, &mut bus).unwrap();
        session.record(&bus);
        bus
    }

    fn meowth(moves: &[&str]) -> TestCreatureBuilder {
        TestCreatureBuilder::new("Meowth", PokemonType::Normal).with_moves(moves)
    }

    fn pidgey() -> Combatant {
        TestCreatureBuilder::new("Pidgey", PokemonType::Flying).build()
    }

    #[test]
    fn test_growl_lowers_opponent_attack() {
        let mut session = ready_session(vec![meowth(&["Growl"]).build()], vec![pidgey()]);

        use_first_move(&mut session, vec![50]);

        assert_eq!(session.active(Side::B).stat_stages.attack, -1);
        assert_eq!(session.active(Side::A).stat_stages.attack, 0);
        assert_eq!(session.log.last().unwrap(), "Pidgey's Attack fell!");
        assert_eq!(session.turn_owner, Side::B);
    }

    #[test]
    fn test_swords_dance_raises_user_attack() {
        let mut session = ready_session(vec![meowth(&["Swords Dance"]).build()], vec![pidgey()]);

        let bus = use_first_move(&mut session, vec![50]);

        assert_eq!(session.active(Side::A).stat_stages.attack, 2);
        assert!(bus.events().contains(&BattleEvent::StatStageChanged {
            target: "Meowth".to_string(),
            stat: StatType::Attack,
            old_stage: 0,
            new_stage: 2,
        }));
    }

    #[test]
    fn test_stat_stage_is_capped() {
        let mut attacker = meowth(&["Swords Dance"]).build();
        attacker.stat_stages.attack = 5;
        let mut session = ready_session(vec![attacker], vec![pidgey()]);

        use_first_move(&mut session, vec![50]);
        assert_eq!(session.active(Side::A).stat_stages.attack, 6);
        assert_eq!(session.log.last().unwrap(), "Meowth's Attack rose!");

        session.turn_owner = Side::A;
        use_first_move(&mut session, vec![50]);
        assert_eq!(session.active(Side::A).stat_stages.attack, 6);
        assert_eq!(session.log.last().unwrap(), "Meowth's Attack won't go any higher!");
    }

    #[test]
    fn test_sleep_powder_puts_target_to_sleep() {
        let mut session = ready_session(vec![meowth(&["Sleep Powder"]).build()], vec![pidgey()]);

        use_first_move(&mut session, vec![75]);

        let target = session.active(Side::B);
        assert_eq!(target.condition, Some(ConditionKind::Asleep));
        assert_eq!(target.condition_turns_remaining, 2);
        assert_eq!(session.log.last().unwrap(), "Pidgey fell asleep!");
    }

    #[test]
    fn test_sleep_powder_can_miss() {
        let mut session = ready_session(vec![meowth(&["Sleep Powder"]).build()], vec![pidgey()]);

        use_first_move(&mut session, vec![76]);

        assert_eq!(session.active(Side::B).condition, None);
        assert_eq!(session.active(Side::A).moves[0].current_pp, 14);
        assert_eq!(session.log.last().unwrap(), "Meowth's attack missed!");
    }

    #[test]
    fn test_status_fails_on_already_afflicted_target() {
        let defender = TestCreatureBuilder::new("Pidgey", PokemonType::Flying)
            .with_condition(ConditionKind::Poisoned, 0)
            .build();
        let mut session = ready_session(vec![meowth(&["Confuse Ray"]).build()], vec![defender]);

        use_first_move(&mut session, vec![50]);

        assert_eq!(session.active(Side::B).condition, Some(ConditionKind::Poisoned));
        assert_eq!(session.log.last().unwrap(), "But it failed!");
        assert_eq!(session.turn_owner, Side::B);
    }

    #[test]
    fn test_confuse_ray_sets_three_turns() {
        let mut session = ready_session(vec![meowth(&["Confuse Ray"]).build()], vec![pidgey()]);

        use_first_move(&mut session, vec![50]);

        let target = session.active(Side::B);
        assert_eq!(target.condition, Some(ConditionKind::Confused));
        assert_eq!(target.condition_turns_remaining, 3);
    }

    #[test]
    fn test_heal_is_capped_at_max_hp() {
        let mut recover = custom_move("Recover", MoveCategory::Status, PokemonType::Normal, 0);
        recover.healing_fraction = 0.5;
        recover.target = Target::User;
        let user = TestCreatureBuilder::new("Chansey", PokemonType::Normal)
            .with_move(recover)
            .with_hp(90)
            .build();
        let mut session = ready_session(vec![user], vec![pidgey()]);

        // Never misses, so nothing is drawn.
        use_first_move(&mut session, Vec::new());

        assert_eq!(session.active(Side::A).current_hp, 100);
        assert_eq!(session.log.last().unwrap(), "Chansey recovered 10 HP!");
    }

    #[test]
    fn test_heal_restores_fraction_of_max_hp() {
        let mut recover = custom_move("Recover", MoveCategory::Status, PokemonType::Normal, 0);
        recover.healing_fraction = 0.5;
        recover.target = Target::User;
        let user = TestCreatureBuilder::new("Chansey", PokemonType::Normal)
            .with_move(recover)
            .with_hp(30)
            .build();
        let mut session = ready_session(vec![user], vec![pidgey()]);

        use_first_move(&mut session, Vec::new());

        assert_eq!(session.active(Side::A).current_hp, 80);
    }

    #[test]
    fn test_fire_punch_secondary_burn_on_ten() {
        let mut session = ready_session(vec![meowth(&["Fire Punch"]).build()], vec![pidgey()]);

        // accuracy, crit check, jitter +2, burn roll
        use_first_move(&mut session, vec![50, 50, 50, 10]);

        let target = session.active(Side::B);
        assert_eq!(target.current_hp, 100 - 39);
        assert_eq!(target.condition, Some(ConditionKind::Burned));
        assert_eq!(session.log.last().unwrap(), "Pidgey was burned!");
    }

    #[test]
    fn test_fire_punch_no_burn_on_eleven() {
        let mut session = ready_session(vec![meowth(&["Fire Punch"]).build()], vec![pidgey()]);

        use_first_move(&mut session, vec![50, 50, 50, 11]);

        assert_eq!(session.active(Side::B).condition, None);
        assert_eq!(session.log.last().unwrap(), "Pidgey took 39 damage!");
    }
}
