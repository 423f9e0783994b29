use serde_json::{json, Value};
use uponor_jnap::{Error, MessageLogMode, Temperature, UponorClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GET_ACTION: &str = "http://phyn.com/jnap/uponorsky/GetAttributes";
const SET_ACTION: &str = "http://phyn.com/jnap/uponorsky/SetAttributes";

fn client_for(server: &MockServer) -> UponorClient {
    let addr = server.address();
    UponorClient::builder(format!("{}:{}", addr.ip(), addr.port()))
        .build()
        .expect("client should build")
}

fn vars_body(vars: &[(&str, &str)]) -> Value {
    let vars: Vec<Value> = vars
        .iter()
        .map(|(n, v)| json!({"waspVarName": n, "waspVarValue": v}))
        .collect();
    json!({"result": "OK", "output": {"vars": vars}})
}

async fn mount_read(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/JNAP/"))
        .and(header("x-jnap-action", GET_ACTION))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_all_sends_get_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/JNAP/"))
        .and(header("x-jnap-action", GET_ACTION))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(vars_body(&[
            ("sys_heat_cool_mode", "0"),
            ("C1_T1_setpoint", "707"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server).fetch_all().await.expect("fetch should succeed");
    assert_eq!(snapshot.vars.get("C1_T1_setpoint"), Some("707"));
    assert_eq!(snapshot.raw["result"], "OK");
    assert!(snapshot.raw["output"]["vars"].is_array());
}

#[tokio::test]
async fn write_variables_sends_set_attributes() {
    let server = MockServer::start().await;
    let ack = json!({"result": "OK", "output": {}});
    Mock::given(method("POST"))
        .and(path("/JNAP/"))
        .and(header("x-jnap-action", SET_ACTION))
        .and(body_json(json!({
            "vars": [{"waspVarName": "C2_T5_setpoint", "waspVarValue": "707"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ack))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .set_temperature_for("C2_T5".parse().unwrap(), Temperature::from_celsius(21.5))
        .await
        .expect("write should succeed");
    assert_eq!(result, ack);
}

#[tokio::test]
async fn presence_scan_finds_single_thermostat() {
    let server = MockServer::start().await;
    let mut vars = vec![
        ("sys_controller_2_presence".to_string(), "1".to_string()),
        ("C2_thermostat_5_presence".to_string(), "1".to_string()),
    ];
    for c in [1, 3, 4, 5] {
        vars.push((format!("sys_controller_{c}_presence"), "0".to_string()));
    }
    for t in (1..=13).filter(|t| *t != 5) {
        vars.push((format!("C2_thermostat_{t}_presence"), "0".to_string()));
    }
    let pairs: Vec<(&str, &str)> = vars.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
    mount_read(&server, vars_body(&pairs)).await;

    let thermostats = client_for(&server).list_thermostats().await.unwrap();
    assert_eq!(thermostats.len(), 1);
    assert_eq!(thermostats[0].code.to_string(), "C2_T5");
    assert!(thermostats[0].setpoint.is_none());
}

#[tokio::test]
async fn system_mode_reads_flags() {
    let server = MockServer::start().await;
    mount_read(
        &server,
        vars_body(&[("sys_heat_cool_mode", "1"), ("sys_forced_eco_mode", "1")]),
    )
    .await;

    let mode = client_for(&server).get_system_mode().await.unwrap();
    assert!(mode.is_cooling);
    assert!(mode.is_away);
}

#[tokio::test]
async fn non_ok_result_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/JNAP/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ErrorUnknown"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).set_away_mode(true).await.unwrap_err();
    match err {
        Error::Rejected { result, .. } => assert_eq!(result, "ErrorUnknown"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn http_500_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/JNAP/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_all().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "expected Http, got {err:?}");
    assert!(err.is_upstream());
}

#[tokio::test]
async fn malformed_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/JNAP/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_all().await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)), "expected Protocol, got {err:?}");
}

#[tokio::test]
async fn unreachable_device_is_http_error() {
    let client = UponorClient::builder("127.0.0.1:1").build().unwrap();
    let err = client.list_thermostats().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "expected Http, got {err:?}");
}

#[tokio::test]
async fn message_log_records_exchange() {
    let server = MockServer::start().await;
    mount_read(&server, vars_body(&[("sys_heat_cool_mode", "0")])).await;

    let tmp = tempfile::NamedTempFile::new().unwrap();
    let log_path = tmp.path().to_str().unwrap().to_string();
    let addr = server.address();
    let client = UponorClient::builder(format!("{}:{}", addr.ip(), addr.port()))
        .message_log(MessageLogMode::Full, log_path.clone())
        .build()
        .unwrap();

    client.fetch_all().await.unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["dir"], "req");
    assert_eq!(lines[0]["action"], "GetAttributes");
    assert_eq!(lines[1]["dir"], "resp");
    assert_eq!(lines[1]["status"], 200);
    assert_eq!(lines[1]["result"], "OK");
}
