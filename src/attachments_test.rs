#[cfg(test)]
mod tests {
    use crate::attachments::*;
    use crate::config::Config;
    use crate::errors::DispatchError;
    use crate::struct_event::Notification;
    use serde_json::{self, Value};

    fn config() -> Config {
        Config {
            webhook_url: "https://hooks.slack.com/services/T0/B0/x".to_string(),
            channel: "#alerts".to_string(),
            username: "aws-bot".to_string(),
            icon_emoji: ":aws:".to_string(),
            environment: "prod".to_string(),
        }
    }

    fn format(json: &str) -> Result<crate::slack_client::SlackPayload, DispatchError> {
        let message: Value = serde_json::from_str(json).unwrap();
        let notification = Notification::parse(&message)?;
        build_payload(&notification, "eu-west-1", &config())
    }

    #[test]
    fn test_cloudwatch_alarm_end_to_end() {
        let json = r#"{
            "AlarmName": "Example",
            "AlarmDescription": "d",
            "NewStateValue": "ALARM",
            "OldStateValue": "OK",
            "NewStateReason": "r"
        }"#;

        let payload = format(json).unwrap();
        assert_eq!(payload.text, "AWS CloudWatch notification - Example");
        assert_eq!(payload.channel, "#alerts");
        assert_eq!(payload.username, "aws-bot");
        assert_eq!(payload.icon_emoji, ":aws:");
        assert_eq!(payload.attachments.len(), 1);

        let attachment = &payload.attachments[0];
        assert_eq!(attachment.color.as_deref(), Some("danger"));
        assert_eq!(attachment.fallback, "Alarm Example triggered");
        assert_eq!(attachment.fields.len(), 7);

        let env = attachment.fields.iter().find(|f| f.title == "Environment").unwrap();
        assert_eq!(env.value, "prod");
        assert!(env.short);

        let link = attachment.fields.iter().find(|f| f.title == "Link to Alarm").unwrap();
        assert_eq!(
            link.value,
            "https://console.aws.amazon.com/cloudwatch/home?region=eu-west-1#alarm:alarmFilter=ANY;name=Example"
        );
    }

    #[test]
    fn test_alarm_state_colors() {
        assert_eq!(AlarmState::parse("OK").unwrap().color(), "good");
        assert_eq!(AlarmState::parse("INSUFFICIENT_DATA").unwrap().color(), "warning");
        assert_eq!(AlarmState::parse("ALARM").unwrap().color(), "danger");
    }

    #[test]
    fn test_unknown_alarm_state() {
        let json = r#"{
            "AlarmName": "Example",
            "AlarmDescription": "d",
            "NewStateValue": "alarm",
            "OldStateValue": "OK",
            "NewStateReason": "r"
        }"#;

        match format(json) {
            Err(DispatchError::UnknownState(state)) => assert_eq!(state, "alarm"),
            other => panic!("expected UnknownState, got {:?}", other.map(|p| p.text)),
        }
    }

    #[test]
    fn test_alarm_link_plus_encodes_spaces() {
        let link = alarm_console_link("us-east-1", "My Alarm");
        assert!(link.ends_with("name=My+Alarm"));

        let link = alarm_console_link("us-east-1", "cpu>90% / web");
        assert!(link.ends_with("name=cpu%3E90%25+%2F+web"));
    }

    #[test]
    fn test_alarm_link_matches_quote_plus_safe_set() {
        let link = alarm_console_link("us-east-1", "a*b~c_d.e-f");
        assert!(link.ends_with("name=a%2Ab~c_d.e-f"));
    }

    #[test]
    fn test_alarm_missing_reason_is_missing_field() {
        let json = r#"{"AlarmName": "Example", "NewStateValue": "OK", "OldStateValue": "OK"}"#;
        assert!(matches!(format(json), Err(DispatchError::MissingField { .. })));
    }

    #[test]
    fn test_codepipeline_approval() {
        let json = r#"{
            "region": "eu-west-1",
            "consoleLink": "https://console.aws.amazon.com/codepipeline/home?region=eu-west-1#/view/deploy",
            "approval": {
                "pipelineName": "deploy",
                "stageName": "Prod",
                "actionName": "ManualApproval",
                "token": "1a2b3c",
                "expires": "2024-01-08T12:00Z",
                "externalEntityLink": null,
                "approvalReviewLink": "https://console.aws.amazon.com/codepipeline/home?region=eu-west-1#/view/deploy/Prod/ManualApproval/approve/1a2b3c",
                "customData": null
            }
        }"#;

        let payload = format(json).unwrap();
        assert_eq!(payload.text, "AWS CodePipeline Approval - deploy");

        let attachment = &payload.attachments[0];
        assert!(attachment.color.is_none());
        let titles: Vec<&str> = attachment.fields.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["Project", "Action Name", "Stage Name", "Region"]);
        assert_eq!(attachment.fields[3].value, "eu-west-1");

        assert_eq!(attachment.actions.len(), 2);
        assert_eq!(attachment.actions[0].text, "Approve");
        assert_eq!(attachment.actions[0].style.as_deref(), Some("danger"));
        assert!(attachment.actions[0].url.ends_with("/approve/1a2b3c"));
        assert_eq!(attachment.actions[1].text, "Pipeline");
        assert!(attachment.actions[1].style.is_none());
        assert!(attachment.actions[1].url.ends_with("#/view/deploy"));
        assert!(attachment
            .fallback
            .starts_with("CodePipeline deploy-eu-west-1 Approval Requested: "));
    }

    #[test]
    fn test_ec2_termination() {
        let json = r#"{
            "source": "aws.ec2",
            "detail-type": "EC2 Instance State-change Notification",
            "detail": {"instance-id": "i-0123456789abcdef0", "state": "terminated"}
        }"#;

        let payload = format(json).unwrap();
        assert_eq!(payload.text, "EC2 Instance Terminated: i-0123456789abcdef0");

        let attachment = &payload.attachments[0];
        assert_eq!(
            attachment.fallback,
            "EC2 Instance Terminated in eu-west-1: i-0123456789abcdef0"
        );
        assert_eq!(attachment.fields.len(), 3);
        assert!(attachment.fields.iter().all(|f| f.short));
        assert_eq!(attachment.fields[2].value, "prod");
    }

    #[test]
    fn test_guardduty_finding() {
        let json = r#"{
            "source": "aws.guardduty",
            "detail-type": "GuardDuty Finding",
            "detail": {
                "type": "Recon:EC2/PortProbeUnprotectedPort",
                "title": "Unprotected port on EC2 instance is being probed.",
                "description": "EC2 instance has an unprotected port which is being probed.",
                "severity": 2,
                "service": {"eventFirstSeen": "2024-01-05T10:00:00Z", "count": 3}
            }
        }"#;

        let payload = format(json).unwrap();
        assert_eq!(
            payload.text,
            "AWS GuardDuty notification - Recon:EC2/PortProbeUnprotectedPort"
        );

        let attachment = &payload.attachments[0];
        assert_eq!(attachment.fields.len(), 5);
        assert!(!attachment.fields[0].short);
        assert!(!attachment.fields[1].short);
        assert_eq!(attachment.fields[2].title, "First Seen");
        assert_eq!(attachment.fields[2].value, "2024-01-05T10:00:00Z");
        assert!(attachment
            .fallback
            .starts_with("GuardDuty finding in eu-west-1 first seen at 2024-01-05T10:00:00Z: "));
    }

    #[test]
    fn test_generic_message() {
        let payload = format(r#"{"foo":"bar"}"#).unwrap();
        assert_eq!(payload.text, "AWS notification");

        let attachment = &payload.attachments[0];
        assert_eq!(attachment.fallback, "A new message");
        assert_eq!(attachment.fields.len(), 1);
        assert_eq!(attachment.fields[0].title, "Message");
        assert_eq!(attachment.fields[0].value, r#"{"foo": "bar"}"#);
        assert!(!attachment.fields[0].short);
    }

    #[test]
    fn test_spaced_json_keeps_key_order() {
        let value: Value =
            serde_json::from_str(r#"{"z":1,"a":[1,2,{"k":null}],"m":true}"#).unwrap();
        assert_eq!(
            spaced_json(&value).unwrap(),
            r#"{"z": 1, "a": [1, 2, {"k": null}], "m": true}"#
        );
    }

    #[test]
    fn test_spaced_json_escapes_non_ascii() {
        let value: Value =
            serde_json::from_str(r#"{"name":"café 🚀","note":"line\nbreak"}"#).unwrap();
        assert_eq!(
            spaced_json(&value).unwrap(),
            r#"{"name": "caf\u00e9 \ud83d\ude80", "note": "line\nbreak"}"#
        );
    }
}
