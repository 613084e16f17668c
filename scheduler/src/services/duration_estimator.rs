use missionhub_models::{MissionTask, Position, RobotModel};

/// Assumed robot velocity, 1.5 km/h expressed in metres per minute
const ROBOT_VELOCITY_M_PER_MIN: f64 = 1.5 * 1000.0 / 60.0;
const EFFICIENCY_FACTOR: f64 = 0.20;
const MINUTES_PER_INSPECTED_TAG: f64 = 2.0;
/// Staging point sits this far from the origin along X and Y
const STAGING_OFFSET_M: f64 = 20.0;

/// Estimated run duration in seconds.
///
/// Uses the model's measured time per tag when known, otherwise a travel
/// heuristic over the XY Manhattan distance between consecutive poses.
pub fn estimate_duration(tasks: &[MissionTask], robot_model: &RobotModel) -> u64 {
    if tasks.is_empty() {
        return 0;
    }

    match robot_model.average_duration_per_tag {
        Some(average) => estimate_from_average(tasks, average),
        None => estimate_from_distance(tasks),
    }
}

fn estimate_from_average(tasks: &[MissionTask], average_per_tag: f32) -> u64 {
    let video_seconds: f64 = tasks
        .iter()
        .filter_map(|task| task.inspection.as_ref())
        .filter_map(|inspection| inspection.video_duration)
        .map(f64::from)
        .sum();

    let seconds = f64::from(average_per_tag) * tasks.len() as f64 + video_seconds;
    seconds.max(0.0) as u64
}

fn estimate_from_distance(tasks: &[MissionTask]) -> u64 {
    let first_z = tasks[0].robot_pose.position.z;
    let mut previous = Position::new(STAGING_OFFSET_M, STAGING_OFFSET_M, first_z);

    let mut distance = 0.0;
    for task in tasks {
        let current = task.robot_pose.position;
        distance += previous.manhattan_distance_xy(&current);
        previous = current;
    }

    let inspected_tags = tasks.iter().filter(|task| task.inspection.is_some()).count() as f64;
    let minutes = distance / (ROBOT_VELOCITY_M_PER_MIN * EFFICIENCY_FACTOR) + inspected_tags * MINUTES_PER_INSPECTED_TAG;

    (minutes * 60.0).max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use missionhub_models::{Inspection, InspectionType, Pose, RobotType};

    fn inspection_task(order: u32, x: f64, y: f64) -> MissionTask {
        MissionTask::inspection(order, Pose::at(x, y, 0.0), "TAG", Inspection::new(InspectionType::Image))
    }

    #[test]
    fn test_single_task_at_staging_point() {
        let model = RobotModel::new(RobotType::AnymalX);
        let tasks = vec![inspection_task(0, 20.0, 20.0)];
        assert_eq!(estimate_duration(&tasks, &model), 120);
    }

    #[test]
    fn test_travel_adds_to_estimate() {
        let model = RobotModel::new(RobotType::AnymalX);
        // 5 m/min effective speed: 10 m away from staging is 2 minutes
        let tasks = vec![inspection_task(0, 25.0, 25.0)];
        assert_eq!(estimate_duration(&tasks, &model), 240);

        let tasks = vec![inspection_task(0, 20.0, 20.0), MissionTask::drive_to(1, Pose::at(20.0, 30.0, 5.0))];
        assert_eq!(estimate_duration(&tasks, &model), 240);
    }

    #[test]
    fn test_average_duration_path() {
        let mut model = RobotModel::new(RobotType::AnymalX);
        model.average_duration_per_tag = Some(30.0);

        let video = MissionTask::inspection(
            1,
            Pose::default(),
            "TAG-V",
            Inspection::new(InspectionType::Video).with_video_duration(15.0),
        );
        let tasks = vec![inspection_task(0, 0.0, 0.0), video];
        assert_eq!(estimate_duration(&tasks, &model), 75);
    }

    #[test]
    fn test_empty_list_is_zero() {
        let model = RobotModel::new(RobotType::AnymalX);
        assert_eq!(estimate_duration(&[], &model), 0);
    }

    #[test]
    fn test_estimate_does_not_touch_tasks() {
        let model = RobotModel::new(RobotType::AnymalX);
        let tasks = vec![inspection_task(0, 3.0, 4.0)];
        let before = tasks.clone();
        estimate_duration(&tasks, &model);
        assert_eq!(tasks, before);
    }
}
