//! 自动阶段集成测试
//!
//! 例程 JSON → 编译 → 在模拟硬件上完整运行。

mod common;

use common::{config_with_paths, run, run_until_idle, setup};
use reef_sdk::driver::PieceSensors;
use reef_sdk::prelude::*;

const TWO_CORAL: &str = r#"{
    "name": "two_coral",
    "start": "S1",
    "human_player": "HP2",
    "tasks": [
        { "type": "ScoreCoral", "position": "A", "level": "L4" },
        { "type": "ScoreCoral", "position": "B", "level": "L2" }
    ]
}"#;

fn two_coral_config() -> RobotConfig {
    config_with_paths(&[
        ("S1-HP2", 3.0),
        ("HP2-A", 4.0),
        ("A-HP2", 3.0),
        ("HP2-B", 4.0),
    ])
}

fn compile(config: &RobotConfig, json: &str) -> Plan {
    let routine = RoutineSpec::from_json_str(json).unwrap();
    let mut library = PathLibrary::from_entries(&config.auto.paths);
    routine.compile(config, &mut library)
}

#[test]
fn test_two_coral_autonomous_runs_to_completion() {
    reef_sdk::logging::init_test_logger();
    let config = two_coral_config();
    let plan = compile(&config, TWO_CORAL);
    assert_eq!(plan.legs().len(), 2);

    let (rig, mut robot) = setup(config);
    robot.set_may_place(true);
    let id = robot.run_autonomous(plan.to_action()).unwrap();

    assert!(run_until_idle(&rig, &mut robot, 5000).is_some());
    assert_eq!(
        rig.paths.followed(),
        vec!["S1-HP2", "HP2-A", "A-HP2", "HP2-B"]
    );
    assert!(rig.paths.cancelled().is_empty());

    let report = robot
        .take_completions()
        .into_iter()
        .find(|r| r.id == id)
        .expect("plan reported");
    assert_eq!(report.kind, RequestKind::Autonomous);
    assert_eq!(report.outcome, Outcome::Completed);

    // 第二个珊瑚已经放出
    assert_eq!(rig.grabber.read_piece_sensors(), PieceSensors::default());
    assert!(!robot.state().game_piece_held());
}

#[test]
fn test_score_waits_for_may_place() {
    let config = two_coral_config();
    let plan = compile(&config, TWO_CORAL);
    let (rig, mut robot) = setup(config);
    let id = robot.run_autonomous(plan.to_action()).unwrap();

    // 两段路径都已跑完，得分宏仍在等待放置许可
    run(&rig, &mut robot, 800);
    assert!(robot.is_active(id));
    assert_eq!(rig.paths.followed(), vec!["S1-HP2", "HP2-A"]);
    assert!(robot.state().game_piece_held());

    robot.set_may_place(true);
    assert!(run_until_idle(&rig, &mut robot, 5000).is_some());
    assert_eq!(rig.paths.followed().len(), 4);
}

#[test]
fn test_missing_path_drops_only_its_task() {
    let config = config_with_paths(&[("S1-HP2", 2.0), ("HP2-A", 2.0), ("B-HP2", 2.0)]);
    let plan = compile(
        &config,
        r#"{
            "name": "gap",
            "start": "S1",
            "human_player": "HP2",
            "tasks": [
                { "type": "ScoreCoral", "position": "A", "level": "L1" },
                { "type": "ScoreCoral", "position": "B", "level": "L1" },
                { "type": "PickupCoral", "station": "HP1" }
            ]
        }"#,
    );
    assert_eq!(plan.legs().len(), 1);
    assert_eq!(plan.dropped().len(), 2);

    let (rig, mut robot) = setup(config);
    robot.set_may_place(true);
    robot.run_autonomous(plan.to_action()).unwrap();
    assert!(run_until_idle(&rig, &mut robot, 3000).is_some());
    assert_eq!(rig.paths.followed(), vec!["S1-HP2", "HP2-A"]);
}

#[test]
fn test_empty_plan_finishes_immediately() {
    let config = config_with_paths(&[("HP2-A", 2.0)]);
    let plan = compile(
        &config,
        r#"{ "name": "none", "start": "S1", "human_player": "HP2",
             "tasks": [{ "type": "ScoreCoral", "position": "A", "level": "L4" }] }"#,
    );
    assert!(plan.is_empty());

    let (_rig, mut robot) = setup(config);
    let id = robot.run_autonomous(plan.to_action()).unwrap();
    assert!(!robot.is_active(id));
    assert_eq!(robot.take_completions()[0].outcome, Outcome::Completed);
}

#[test]
fn test_emergency_stop_during_autonomous() {
    let config = two_coral_config();
    let plan = compile(&config, TWO_CORAL);
    let (rig, mut robot) = setup(config);
    let id = robot.run_autonomous(plan.to_action()).unwrap();

    run(&rig, &mut robot, 50);
    robot.emergency_stop();

    assert!(!robot.is_active(id));
    assert_eq!(rig.paths.cancelled(), vec!["S1-HP2"]);
    assert_eq!(rig.lift.setpoint(), None);
    assert_eq!(rig.arm.setpoint(), None);
    assert_eq!(rig.grabber.setpoint(), None);
    assert!(rig.base.stop_count() >= 1);
    assert_eq!(robot.state().robot_state(), RobotState::Ready);

    let report = robot
        .take_completions()
        .into_iter()
        .find(|r| r.id == id)
        .unwrap();
    assert_eq!(report.outcome, Outcome::Interrupted);
}

#[test]
fn test_operator_macro_interrupts_plan() {
    let config = two_coral_config();
    let plan = compile(&config, TWO_CORAL);
    let (rig, mut robot) = setup(config);
    let plan_id = robot.run_autonomous(plan.to_action()).unwrap();
    run(&rig, &mut robot, 10);

    let stow = robot.request_macro(MacroRequest::Stow).unwrap();
    assert!(!robot.is_active(plan_id));
    assert!(robot.is_active(stow));
    assert_eq!(rig.paths.cancelled(), vec!["S1-HP2"]);
}

#[test]
fn test_registry_selects_plan_by_name() {
    let config = two_coral_config();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("two_coral.json"), TWO_CORAL).unwrap();

    let mut library = PathLibrary::from_entries(&config.auto.paths);
    let mut registry = PlanRegistry::new();
    assert_eq!(registry.load_dir(dir.path(), &config, &mut library).unwrap(), 1);

    let (rig, mut robot) = setup(config);
    robot.set_may_place(true);
    robot
        .run_autonomous(registry.action("two_coral").unwrap())
        .unwrap();
    assert!(run_until_idle(&rig, &mut robot, 5000).is_some());
    assert!(matches!(
        registry.action("three_coral"),
        Err(ControlError::UnknownPlan(_))
    ));
}
