use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{Value, json};
use url::Url;
use xms::domain::MAX_BINARY_SIZE;
use xms::{Address, DeliveryReportType, MtBatchCreate, MtBatchUpdate, UpdateValue};

fn address() -> impl Strategy<Value = Address> {
    "[1-9][0-9]{4,11}".prop_map(|value| Address::new(value).unwrap())
}

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (1_400_000_000i64..2_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn report_type() -> impl Strategy<Value = DeliveryReportType> {
    prop_oneof![
        Just(DeliveryReportType::None),
        Just(DeliveryReportType::Summary),
        Just(DeliveryReportType::Full),
        Just(DeliveryReportType::PerRecipient),
    ]
}

#[derive(Debug, Clone)]
enum Payload {
    Text {
        body: String,
        /// (name, recipient index, value)
        parameters: Vec<(String, usize, String)>,
        defaults: Vec<(String, String)>,
    },
    Binary {
        body: Vec<u8>,
        udh: Vec<u8>,
    },
}

fn payload() -> impl Strategy<Value = Payload> {
    let parameter_name = "[a-z]{1,6}";
    let parameter_value = "[a-zA-Z0-9 ]{1,10}";
    prop_oneof![
        (
            "[^\u{0}]{1,160}",
            prop::collection::vec((parameter_name, any::<usize>(), parameter_value), 0..4),
            prop::collection::vec((parameter_name, parameter_value), 0..2),
        )
            .prop_map(|(body, parameters, defaults)| Payload::Text {
                body,
                parameters,
                defaults,
            }),
        (
            prop::collection::vec(any::<u8>(), 0..=100),
            prop::collection::vec(any::<u8>(), 0..=40),
        )
            .prop_map(|(body, udh)| Payload::Binary { body, udh }),
    ]
}

fn callback_url() -> impl Strategy<Value = Url> {
    "[a-z]{1,10}".prop_map(|path| {
        Url::parse(&format!("https://callbacks.example.com/{path}")).unwrap()
    })
}

proptest! {
    #[test]
    fn batches_survive_the_wire(
        from in address(),
        to in prop::collection::vec(address(), 1..5),
        payload in payload(),
        report in prop::option::of(report_type()),
        send_at in prop::option::of(timestamp()),
        expire_after in prop::option::of(1i64..1_000_000),
        callback in prop::option::of(callback_url()),
        tags in prop::collection::vec("[a-z]{1,8}", 0..3),
        client_reference in prop::option::of("[a-zA-Z0-9-]{1,20}"),
    ) {
        let mut builder = match payload {
            Payload::Text { body, parameters, defaults } => {
                let mut builder = MtBatchCreate::text(from, body).recipients(to.clone());
                for (name, index, value) in parameters {
                    builder = builder.parameter(name, &to[index % to.len()], value);
                }
                for (name, value) in defaults {
                    builder = builder.parameter_default(name, value);
                }
                builder
            }
            Payload::Binary { body, udh } => MtBatchCreate::binary(from, body, udh).recipients(to),
        };
        if let Some(report) = report {
            builder = builder.delivery_report(report);
        }
        if let Some(send_at) = send_at {
            builder = builder.send_at(send_at);
        }
        if let Some(secs) = expire_after {
            let base = send_at.unwrap_or_else(|| Utc.timestamp_opt(1_400_000_000, 0).unwrap());
            builder = builder.expire_at(base + Duration::seconds(secs));
        }
        if let Some(url) = callback {
            builder = builder.callback_url(url);
        }
        for tag in tags {
            builder = builder.tag(tag);
        }
        if let Some(reference) = client_reference {
            builder = builder.client_reference(reference);
        }
        let batch = builder.build().unwrap();

        let wire = serde_json::to_string(&batch).unwrap();
        let decoded: MtBatchCreate = serde_json::from_str(&wire).unwrap();
        prop_assert_eq!(decoded, batch);
    }

    #[test]
    fn binary_batches_respect_the_size_limit(
        body in prop::collection::vec(any::<u8>(), 0..160),
        udh in prop::collection::vec(any::<u8>(), 0..20),
    ) {
        let built = MtBatchCreate::binary(Address::new("12345").unwrap(), body.clone(), udh.clone())
            .to(Address::new("987654321").unwrap())
            .build();
        prop_assert_eq!(built.is_ok(), body.len() + udh.len() <= MAX_BINARY_SIZE);

        if let Ok(batch) = built {
            let wire = serde_json::to_value(&batch).unwrap();
            prop_assert_eq!(&wire["body"], &Value::String(hex::encode(&body)));
            prop_assert_eq!(&wire["udh"], &Value::String(hex::encode(&udh)));
        }
    }
}

#[test]
fn update_distinguishes_unchanged_clear_and_set() {
    let update = MtBatchUpdate::text()
        .delivery_report(UpdateValue::Clear)
        .send_at(UpdateValue::Set(Utc.with_ymd_and_hms(2016, 12, 1, 10, 0, 0).unwrap()))
        .build()
        .unwrap();

    assert_eq!(
        serde_json::to_value(&update).unwrap(),
        json!({
            "type": "mt_text",
            "delivery_report": null,
            "send_at": "2016-12-01T10:00:00Z"
        })
    );
}

#[test]
fn decoding_rejects_invalid_batches() {
    let missing_recipients = json!({ "type": "mt_text", "from": "12345", "to": [], "body": "hi" });
    assert!(serde_json::from_value::<MtBatchCreate>(missing_recipients).is_err());

    let bad_schedule = json!({
        "type": "mt_text",
        "from": "12345",
        "to": ["987654321"],
        "body": "hi",
        "send_at": "2016-12-02T00:00:00Z",
        "expire_at": "2016-12-01T00:00:00Z"
    });
    assert!(serde_json::from_value::<MtBatchCreate>(bad_schedule).is_err());
}
