use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DispatchError, DispatchResult};

// CloudWatch alarm state change, as published to SNS.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudWatchAlarm {
    pub alarm_name: String,
    // the key must be present, but CloudWatch sends null when unset
    #[serde(deserialize_with = "Option::deserialize")]
    pub alarm_description: Option<String>,
    pub new_state_reason: String,
    pub new_state_value: String,
    pub old_state_value: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineApproval {
    pub console_link: String,
    pub approval: Approval,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub pipeline_name: String,
    pub stage_name: String,
    pub action_name: String,
    pub approval_review_link: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Ec2StateChange {
    pub detail: Ec2Detail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Ec2Detail {
    #[serde(rename = "instance-id")]
    pub instance_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GuardDutyEvent {
    pub detail: GuardDutyDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GuardDutyDetail {
    #[serde(rename = "type")]
    pub finding_type: String,
    pub title: String,
    pub description: String,
    pub service: GuardDutyService,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardDutyService {
    pub event_first_seen: String,
}

/// Inbound notification kind, decided by which keys the message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    CloudWatchAlarm,
    PipelineApproval,
    Ec2Termination,
    GuardDutyFinding,
    Generic,
}

impl NotificationKind {
    pub fn label(self) -> &'static str {
        match self {
            NotificationKind::CloudWatchAlarm => "CloudWatch alarm",
            NotificationKind::PipelineApproval => "CodePipeline approval",
            NotificationKind::Ec2Termination => "EC2 termination",
            NotificationKind::GuardDutyFinding => "GuardDuty finding",
            NotificationKind::Generic => "generic",
        }
    }
}

/// Classified message with the fields its formatter needs.
#[derive(Debug)]
pub enum Notification<'a> {
    CloudWatchAlarm(CloudWatchAlarm),
    PipelineApproval(PipelineApproval),
    Ec2Termination(Ec2StateChange),
    GuardDutyFinding(GuardDutyEvent),
    Generic(&'a Value),
}

/// Pick the notification kind from the keys present in `message`.
///
/// First match wins: an alarm that also carries `approval` is still an alarm.
pub fn classify(message: &Value) -> NotificationKind {
    if message.get("AlarmName").is_some() {
        return NotificationKind::CloudWatchAlarm;
    }
    if message.get("approval").is_some() {
        return NotificationKind::PipelineApproval;
    }
    match message.get("source").and_then(Value::as_str) {
        Some("aws.ec2") => NotificationKind::Ec2Termination,
        Some("aws.guardduty") => NotificationKind::GuardDutyFinding,
        _ => NotificationKind::Generic,
    }
}

impl<'a> Notification<'a> {
    /// Classify `message` and extract the typed fields for its kind.
    pub fn parse(message: &'a Value) -> DispatchResult<Self> {
        let kind = classify(message);
        let notification = match kind {
            NotificationKind::CloudWatchAlarm => {
                Notification::CloudWatchAlarm(extract(kind, message)?)
            }
            NotificationKind::PipelineApproval => {
                Notification::PipelineApproval(extract(kind, message)?)
            }
            NotificationKind::Ec2Termination => {
                Notification::Ec2Termination(extract(kind, message)?)
            }
            NotificationKind::GuardDutyFinding => {
                Notification::GuardDutyFinding(extract(kind, message)?)
            }
            NotificationKind::Generic => Notification::Generic(message),
        };
        Ok(notification)
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::CloudWatchAlarm(_) => NotificationKind::CloudWatchAlarm,
            Notification::PipelineApproval(_) => NotificationKind::PipelineApproval,
            Notification::Ec2Termination(_) => NotificationKind::Ec2Termination,
            Notification::GuardDutyFinding(_) => NotificationKind::GuardDutyFinding,
            Notification::Generic(_) => NotificationKind::Generic,
        }
    }
}

fn extract<T>(kind: NotificationKind, message: &Value) -> DispatchResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    T::deserialize(message).map_err(|source| DispatchError::MissingField {
        variant: kind.label(),
        source,
    })
}
