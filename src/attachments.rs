use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use url::form_urlencoded;

use crate::config::Config;
use crate::errors::{DispatchError, DispatchResult};
use crate::slack_client::{Action, Attachment, Field, SlackPayload};
use crate::struct_event::{
    CloudWatchAlarm, Ec2StateChange, GuardDutyEvent, Notification, PipelineApproval,
};

/// Attachment color for a CloudWatch alarm state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Ok,
    InsufficientData,
    Alarm,
}

impl AlarmState {
    pub fn parse(value: &str) -> DispatchResult<Self> {
        match value {
            "OK" => Ok(AlarmState::Ok),
            "INSUFFICIENT_DATA" => Ok(AlarmState::InsufficientData),
            "ALARM" => Ok(AlarmState::Alarm),
            other => Err(DispatchError::UnknownState(other.to_string())),
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            AlarmState::Ok => "good",
            AlarmState::InsufficientData => "warning",
            AlarmState::Alarm => "danger",
        }
    }
}

/// Build the full webhook payload for a classified notification.
pub fn build_payload(
    notification: &Notification<'_>,
    region: &str,
    config: &Config,
) -> DispatchResult<SlackPayload> {
    let env = config.environment.as_str();
    let (text, attachment) = match notification {
        Notification::CloudWatchAlarm(alarm) => (
            format!("AWS CloudWatch notification - {}", alarm.alarm_name),
            cloudwatch_attachment(alarm, region, env)?,
        ),
        Notification::PipelineApproval(approval) => (
            format!("AWS CodePipeline Approval - {}", approval.approval.pipeline_name),
            approval_attachment(approval, region),
        ),
        Notification::Ec2Termination(event) => (
            format!("EC2 Instance Terminated: {}", event.detail.instance_id),
            ec2_attachment(event, region, env),
        ),
        Notification::GuardDutyFinding(event) => (
            format!("AWS GuardDuty notification - {}", event.detail.finding_type),
            guardduty_attachment(event, region, env),
        ),
        Notification::Generic(message) => {
            ("AWS notification".to_string(), generic_attachment(message)?)
        }
    };

    Ok(SlackPayload {
        channel: config.channel.clone(),
        username: config.username.clone(),
        icon_emoji: config.icon_emoji.clone(),
        text,
        attachments: vec![attachment],
    })
}

pub fn cloudwatch_attachment(
    alarm: &CloudWatchAlarm,
    region: &str,
    environment: &str,
) -> DispatchResult<Attachment> {
    let state = AlarmState::parse(&alarm.new_state_value)?;

    Ok(Attachment {
        fallback: format!("Alarm {} triggered", alarm.alarm_name),
        color: Some(state.color().to_string()),
        fields: vec![
            Field::short("Alarm Name", alarm.alarm_name.as_str()),
            Field::long("Alarm Description", alarm.alarm_description.clone().unwrap_or_default()),
            Field::long("Alarm reason", alarm.new_state_reason.as_str()),
            Field::short("Old State", alarm.old_state_value.as_str()),
            Field::short("Current State", alarm.new_state_value.as_str()),
            Field::long("Link to Alarm", alarm_console_link(region, &alarm.alarm_name)),
            Field::short("Environment", environment),
        ],
        actions: Vec::new(),
    })
}

/// Console deep link for an alarm.
///
/// The name is encoded like Python's `quote_plus`: spaces become `+`, and
/// only ASCII alphanumerics and `_.-~` are left as they are.
pub fn alarm_console_link(region: &str, alarm_name: &str) -> String {
    let name = quote_plus(alarm_name);
    format!(
        "https://console.aws.amazon.com/cloudwatch/home?region={}#alarm:alarmFilter=ANY;name={}",
        region, name
    )
}

fn quote_plus(value: &str) -> String {
    // form_urlencoded leaves `*` alone and escapes `~`; quote_plus does the reverse
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
        .replace("%7E", "~")
}

pub fn approval_attachment(message: &PipelineApproval, region: &str) -> Attachment {
    let approval = &message.approval;

    Attachment {
        fallback: format!(
            "CodePipeline {}-{} Approval Requested: {}",
            approval.pipeline_name, region, message.console_link
        ),
        color: None,
        fields: vec![
            Field::short("Project", approval.pipeline_name.as_str()),
            Field::short("Action Name", approval.action_name.as_str()),
            Field::short("Stage Name", approval.stage_name.as_str()),
            Field::short("Region", region),
        ],
        actions: vec![
            Action::button("Approve", Some("danger"), approval.approval_review_link.as_str()),
            Action::button("Pipeline", None, message.console_link.as_str()),
        ],
    }
}

pub fn ec2_attachment(event: &Ec2StateChange, region: &str, environment: &str) -> Attachment {
    let instance_id = event.detail.instance_id.as_str();

    Attachment {
        fallback: format!("EC2 Instance Terminated in {}: {}", region, instance_id),
        color: None,
        fields: vec![
            Field::short("Instance", instance_id),
            Field::short("Region", region),
            Field::short("Environment", environment),
        ],
        actions: Vec::new(),
    }
}

pub fn guardduty_attachment(event: &GuardDutyEvent, region: &str, environment: &str) -> Attachment {
    let detail = &event.detail;
    let first_seen = detail.service.event_first_seen.as_str();

    Attachment {
        fallback: format!(
            "GuardDuty finding in {} first seen at {}: {} {}",
            region, first_seen, detail.title, detail.description
        ),
        color: None,
        fields: vec![
            Field::long("Title", detail.title.as_str()),
            Field::long("Description", detail.description.as_str()),
            Field::short("First Seen", first_seen),
            Field::short("Region", region),
            Field::short("Environment", environment),
        ],
        actions: Vec::new(),
    }
}

pub fn generic_attachment(message: &Value) -> DispatchResult<Attachment> {
    Ok(Attachment {
        fallback: "A new message".to_string(),
        color: None,
        fields: vec![Field::long("Message", spaced_json(message)?)],
        actions: Vec::new(),
    })
}

// Writes ", " between items and ": " after keys, and escapes non-ASCII
// characters as `\uXXXX` UTF-16 units.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serialize `value` the way Python's `json.dumps` does by default: one line,
/// a space after every separator, keys in their original order, ASCII only.
pub fn spaced_json(value: &Value) -> DispatchResult<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut serializer).map_err(DispatchError::Serialize)?;

    // the formatter only ever emits ASCII
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
