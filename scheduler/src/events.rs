use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Events emitted for consumers outside the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MissionEvent {
    EmergencyButtonPressedForRobot { robot_id: String, area_id: String },
    EmergencyButtonDepressedForRobot { robot_id: String, area_id: String },
}

impl MissionEvent {
    pub fn robot_id(&self) -> &str {
        match self {
            MissionEvent::EmergencyButtonPressedForRobot { robot_id, .. }
            | MissionEvent::EmergencyButtonDepressedForRobot { robot_id, .. } => robot_id,
        }
    }
}

pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: MissionEvent);
}

/// In-process fan-out over a tokio broadcast channel
pub struct BroadcastEventBus {
    sender: broadcast::Sender<MissionEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MissionEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventPublisher for BroadcastEventBus {
    fn publish(&self, event: MissionEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            debug!("No subscribers for {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = BroadcastEventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(MissionEvent::EmergencyButtonPressedForRobot {
            robot_id: "r1".into(),
            area_id: "a1".into(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.robot_id(), "r1");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = BroadcastEventBus::new(1);
        bus.publish(MissionEvent::EmergencyButtonDepressedForRobot {
            robot_id: "r1".into(),
            area_id: "a1".into(),
        });
    }

    #[test]
    fn test_event_serialization() {
        let event = MissionEvent::EmergencyButtonPressedForRobot {
            robot_id: "r1".into(),
            area_id: "a1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "emergency_button_pressed_for_robot");
    }
}
