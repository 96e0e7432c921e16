#![allow(clippy::unwrap_used)]
// End-to-end pipeline tests against wiremock stand-ins for all three
// collaborators, wired through `LivePipeline::from_config`.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use locus_core::{
    CaptureEvent, CapturePayload, GeocoderSettings, IpLocationSettings, ItemOutcome, LivePipeline,
    LocationSource, PipelineConfig, RequestMetadata, TelegramSettings, Timeouts,
};

// ── Harness ─────────────────────────────────────────────────────────

struct Harness {
    ip: MockServer,
    geocoder: MockServer,
    telegram: MockServer,
    pipeline: LivePipeline,
}

impl Harness {
    async fn start() -> Self {
        let ip = MockServer::start().await;
        let geocoder = MockServer::start().await;
        let telegram = MockServer::start().await;

        let config = PipelineConfig {
            telegram: TelegramSettings {
                api_base: Url::parse(&telegram.uri()).unwrap(),
                bot_token: "42:SECRET".to_string().into(),
                chat_id: "-100777".into(),
            },
            ip_location: IpLocationSettings {
                api_base: Url::parse(&ip.uri()).unwrap(),
                api_key: "ip-key".to_string().into(),
            },
            geocoder: GeocoderSettings {
                api_base: Url::parse(&geocoder.uri()).unwrap(),
                user_agent: "locus-test/1.0".into(),
            },
            timeouts: Timeouts {
                lookup: Duration::from_secs(2),
                message: Duration::from_secs(2),
                upload: Duration::from_secs(2),
            },
        };

        let pipeline = LivePipeline::from_config(&config).unwrap();
        Self {
            ip,
            geocoder,
            telegram,
            pipeline,
        }
    }

    async fn ip_answers(&self) {
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("key", "ip-key"))
            .and(query_param("ip", "203.0.113.9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "203.0.113.9",
                "country_code": "ID",
                "country_name": "Indonesia",
                "region_name": "Jawa Barat",
                "city_name": "Bandung",
                "latitude": -6.9175,
                "longitude": 107.6191,
                "asn": "",
                "as": "AS7713 PT Example",
                "is_proxy": false
            })))
            .expect(1)
            .mount(&self.ip)
            .await;
    }

    async fn telegram_accepts(&self, telegram_method: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/bot42:SECRET/{telegram_method}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(times)
            .mount(&self.telegram)
            .await;
    }
}

fn event(payload: CapturePayload) -> CaptureEvent {
    CaptureEvent::from_payload(
        payload,
        RequestMetadata {
            raw_client_address: "203.0.113.9, 10.0.0.1".into(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".into(),
            referer: "https://example.org/landing".into(),
            request_uri: "/upload-photo".into(),
        },
    )
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn gps_capture_is_geocoded_enriched_and_delivered() {
    let h = Harness::start().await;
    h.ip_answers().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "jsonv2"))
        .and(query_param("lat", "-6.175392"))
        .and(query_param("lon", "106.827153"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": {
                "city": "Jakarta Pusat",
                "state": "DKI Jakarta",
                "country": "Indonesia",
                "country_code": "id"
            }
        })))
        .expect(1)
        .mount(&h.geocoder)
        .await;

    Mock::given(method("POST"))
        .and(path("/bot42:SECRET/sendMessage"))
        .and(body_string_contains("Source: GPS"))
        .and(body_string_contains("Country Code : ID"))
        .and(body_string_contains("City Name : Jakarta Pusat"))
        .and(body_string_contains("Lat: -6.175392"))
        .and(body_string_contains("ISP: PT Example (7713)"))
        .and(body_string_contains("Time: 2024-03-10 00:04:05"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&h.telegram)
        .await;
    h.telegram_accepts("sendPhoto", 2).await;

    let payload = CapturePayload {
        image: vec![
            "data:image/jpeg;base64,b25l".into(),
            "data:image/jpeg;base64,***".into(),
            "data:image/jpeg;base64,dGhyZWU=".into(),
        ],
        camera: vec!["front".into()],
        latitude: -6.175_392,
        longitude: 106.827_153,
        accuracy: 12.0,
        source: "GPS".into(),
        ..CapturePayload::default()
    };
    let now = Utc.with_ymd_and_hms(2024, 3, 9, 17, 4, 5).unwrap();

    let outcome = h.pipeline.process_at(&event(payload), now).await;

    assert_eq!(outcome.estimate.source, LocationSource::Gps);
    assert_eq!(outcome.estimate.city_name, "Jakarta Pusat");
    assert_eq!(outcome.network.asn, "7713");
    assert_eq!(outcome.delivery.message, ItemOutcome::Delivered);
    assert_eq!(outcome.delivery.delivered(), 3);
    assert_eq!(outcome.delivery.failed(), 1);
    assert!(outcome.delivery.photos[1].is_failed());
}

#[tokio::test]
async fn ip_capture_uses_lookup_without_geocoding() {
    let h = Harness::start().await;
    h.ip_answers().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&h.geocoder)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot42:SECRET/sendMessage"))
        .and(body_string_contains("Source: IP"))
        .and(body_string_contains("City Name : Bandung"))
        .and(body_string_contains("Accuracy: 0.0m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&h.telegram)
        .await;

    let outcome = h
        .pipeline
        .process(&event(CapturePayload {
            source: "IP".into(),
            ..CapturePayload::default()
        }))
        .await;

    assert_eq!(outcome.estimate.source, LocationSource::Ip);
    assert_eq!(
        (outcome.estimate.latitude, outcome.estimate.longitude),
        (-6.9175, 107.6191)
    );
    assert!(outcome.delivery.is_complete());
    assert!(outcome.delivery.photos.is_empty());
}

#[tokio::test]
async fn every_collaborator_down_still_attempts_delivery() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.ip)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&h.geocoder)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot42:SECRET/sendMessage"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&h.telegram)
        .await;
    h.telegram_accepts("sendPhoto", 1).await;

    let payload = CapturePayload {
        image: vec!["b25l".into()],
        latitude: 1.25,
        longitude: 2.5,
        source: "GPS".into(),
        ..CapturePayload::default()
    };

    let outcome = h.pipeline.process(&event(payload)).await;

    // Device coordinates survive even with no names at all.
    assert_eq!(outcome.estimate.source, LocationSource::Gps);
    assert_eq!(
        (outcome.estimate.latitude, outcome.estimate.longitude),
        (1.25, 2.5)
    );
    assert_eq!(outcome.estimate.country_name, "");
    assert_eq!(outcome.network, locus_core::NetworkInfo::default());

    assert!(outcome.delivery.message.is_failed());
    assert_eq!(outcome.delivery.photos, vec![ItemOutcome::Delivered]);
}

#[tokio::test]
async fn slow_lookup_times_out_as_ordinary_failure() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&h.ip)
        .await;
    h.telegram_accepts("sendMessage", 1).await;

    let outcome = h.pipeline.process(&event(CapturePayload::default())).await;

    assert_eq!(outcome.estimate.source, LocationSource::Unresolved);
    assert!(outcome.delivery.is_complete());
}

#[tokio::test]
async fn empty_chat_id_is_rejected_at_construction() {
    let config = PipelineConfig {
        telegram: TelegramSettings {
            api_base: Url::parse("https://api.telegram.org").unwrap(),
            bot_token: "1:t".to_string().into(),
            chat_id: " ".into(),
        },
        ip_location: IpLocationSettings {
            api_base: Url::parse("https://api.ip2location.io").unwrap(),
            api_key: "k".to_string().into(),
        },
        geocoder: GeocoderSettings {
            api_base: Url::parse("https://nominatim.openstreetmap.org").unwrap(),
            user_agent: "locus-test/1.0".into(),
        },
        timeouts: Timeouts::default(),
    };

    assert!(matches!(
        LivePipeline::from_config(&config),
        Err(locus_core::CoreError::Config { .. })
    ));
}
