//! Result recorder end to end: ledger expansion, walkover, retries, deletion.

mod common;

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use liga_matchday::handlers::result::{ResultRecorder, ResultStatus};
use liga_matchday::models::ids::{MatchId, PlayerId, TeamId};
use liga_matchday::models::match_info::Side;
use liga_matchday::models::result::EventType;
use liga_matchday::{AppError, AppState};

async fn mount_rosters(server: &MockServer, stored: Value) {
    Mock::given(method("GET"))
        .and(path("/asistencia-partido"))
        .and(query_param("action", "list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(five_a_side_listing())))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/partidos"))
        .and(query_param("action", "resultado"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(stored)))
        .mount(server)
        .await;
}

async fn recorder_for(server: &MockServer) -> ResultRecorder {
    AppState::new(test_config(&server.uri()))
        .unwrap()
        .result_recorder(MatchId(MATCH))
        .await
        .unwrap()
}

#[tokio::test]
async fn finalize_expands_counts_into_one_event_per_unit() {
    let server = MockServer::start().await;
    mount_rosters(&server, Value::Null).await;
    Mock::given(method("POST"))
        .and(path("/partidos"))
        .and(query_param("action", "finalizar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "Resultado guardado"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut recorder = recorder_for(&server).await;
    assert_eq!(recorder.status(), ResultStatus::Draft);

    recorder.set_score(Side::Home, 2).unwrap();
    recorder.set_score(Side::Away, 0).unwrap();
    recorder
        .record_player_event(TeamId(LOCAL), PlayerId(11), EventType::Goal, 2)
        .unwrap();
    recorder
        .record_player_event(TeamId(VISITING), PlayerId(22), EventType::YellowCard, 1)
        .unwrap();
    // Touched and reset to zero: must not appear in the ledger
    recorder
        .record_player_event(TeamId(LOCAL), PlayerId(12), EventType::Assist, 1)
        .unwrap();
    recorder
        .record_player_event(TeamId(LOCAL), PlayerId(12), EventType::Assist, 0)
        .unwrap();
    recorder.toggle_mvp(PlayerId(11)).unwrap();

    recorder.finalize().await.unwrap();
    assert_eq!(recorder.status(), ResultStatus::Finalized);

    let requests = server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let body: Value = post.body_json().unwrap();
    assert_eq!(body["id_partido"], MATCH);
    assert_eq!(body["goles_local"], 2);
    assert_eq!(body["goles_visitante"], 0);
    assert_eq!(body["estado"], "finalizado");
    assert_eq!(body["walkover"], false);
    assert_eq!(body["id_jugador_mvp"], 11);
    assert!(body.get("penales_local").is_none());

    let events = body["eventos"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    let goals: Vec<&Value> = events.iter().filter(|e| e["tipo"] == "gol").collect();
    assert_eq!(goals.len(), 2);
    assert!(goals
        .iter()
        .all(|e| e["id_jugador"] == 11 && e["id_equipo"] == LOCAL && e["minuto"].is_null()));
    let yellows: Vec<&Value> = events.iter().filter(|e| e["tipo"] == "amarilla").collect();
    assert_eq!(yellows.len(), 1);
    assert_eq!(yellows[0]["id_jugador"], 22);
    assert!(events.iter().all(|e| e["id_jugador"] != 12));
}

#[tokio::test]
async fn walkover_submits_three_nil_for_the_winner() {
    let fake = FakeLeagueApi::with_listing(five_a_side_listing());
    let mut recorder = ResultRecorder::load(Arc::new(fake.clone()), MatchId(MATCH))
        .await
        .unwrap();

    recorder.set_score(Side::Home, 1).unwrap();
    recorder.set_score(Side::Away, 1).unwrap();
    recorder.set_penalties(Some((4, 3)));
    recorder.set_walkover(true, Some(Side::Away));

    assert_eq!(recorder.draft().displayed_score(), (0, 3));
    assert!(recorder.set_score(Side::Home, 5).is_err());

    recorder.finalize().await.unwrap();

    let sent = fake.finalize_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!((sent[0].home_score, sent[0].away_score), (0, 3));
    assert!(sent[0].walkover);
    assert_eq!(sent[0].walkover_winner, Some(TeamId(VISITING)));
    assert_eq!(sent[0].home_penalties, None);

    // Leaving the walkover restores the manual score
    recorder.set_walkover(false, None);
    assert_eq!(recorder.draft().displayed_score(), (1, 1));
}

#[tokio::test]
async fn walkover_without_winner_is_rejected_before_sending() {
    let fake = FakeLeagueApi::with_listing(five_a_side_listing());
    let mut recorder = ResultRecorder::load(Arc::new(fake.clone()), MatchId(MATCH))
        .await
        .unwrap();
    recorder.set_walkover(true, None);
    assert_eq!(recorder.draft().displayed_score(), (0, 0));

    let err = recorder.finalize().await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(fake.finalize_requests().is_empty());
    assert_eq!(fake.calls(), vec!["list_attendance", "get_result"]);
}

#[tokio::test]
async fn failed_finalize_keeps_the_draft() {
    let fake = FakeLeagueApi::with_listing(five_a_side_listing());
    fake.fail_mutations(true);
    let mut recorder = ResultRecorder::load(Arc::new(fake.clone()), MatchId(MATCH))
        .await
        .unwrap();

    recorder.set_score(Side::Home, 3).unwrap();
    recorder
        .record_player_event(TeamId(LOCAL), PlayerId(13), EventType::Goal, 3)
        .unwrap();
    let before = recorder.draft().clone();

    let err = recorder.finalize().await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(recorder.status(), ResultStatus::Draft);
    assert_eq!(recorder.draft(), &before);
    assert!(recorder.has_unsaved_changes());

    fake.fail_mutations(false);
    recorder.finalize().await.unwrap();
    assert_eq!(recorder.status(), ResultStatus::Finalized);
    assert_eq!(fake.finalize_requests()[0].events.len(), 3);
}

#[tokio::test]
async fn players_outside_the_match_are_rejected() {
    let fake = FakeLeagueApi::with_listing(five_a_side_listing());
    let mut recorder = ResultRecorder::load(Arc::new(fake), MatchId(MATCH))
        .await
        .unwrap();

    let err = recorder
        .record_player_event(TeamId(LOCAL), PlayerId(21), EventType::Goal, 1)
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(recorder.toggle_mvp(PlayerId(99)).is_err());
}

#[tokio::test]
async fn stored_result_reopens_as_finalized() {
    let fake = FakeLeagueApi::with_listing(five_a_side_listing());
    fake.set_stored(json!({
        "id_partido": MATCH,
        "goles_local": 1,
        "goles_visitante": 1,
        "penales_local": 5,
        "penales_visitante": 4,
        "walkover": false,
        "id_jugador_mvp": 23,
        "eventos": [
            {"tipo": "gol", "minuto": null, "id_jugador": 14, "id_equipo": LOCAL},
            {"tipo": "gol", "minuto": null, "id_jugador": 23, "id_equipo": VISITING},
            {"tipo": "amarilla", "minuto": null, "id_jugador": 25, "id_equipo": VISITING},
            {"tipo": "amarilla", "minuto": null, "id_jugador": 25, "id_equipo": VISITING},
            {"tipo": "roja", "minuto": null, "id_jugador": 25, "id_equipo": VISITING}
        ]
    }));

    let state = AppState::with_api(test_config("http://league.invalid"), Arc::new(fake.clone()));
    let mut recorder = state.result_recorder(MatchId(MATCH)).await.unwrap();
    assert_eq!(recorder.status(), ResultStatus::Finalized);
    assert!(!recorder.has_unsaved_changes());

    let draft = recorder.draft();
    assert_eq!(draft.displayed_score(), (1, 1));
    assert_eq!(draft.penalties(), Some((5, 4)));
    assert_eq!(draft.mvp(), Some(PlayerId(23)));
    let booked = draft.tally(TeamId(VISITING), PlayerId(25));
    assert_eq!((booked.yellow_cards, booked.red_cards), (2, 1));

    assert!(booked.red_from_yellows());

    // Toggling the MVP again clears it
    assert_eq!(recorder.toggle_mvp(PlayerId(23)).unwrap(), None);
    assert_eq!(recorder.status(), ResultStatus::Finalized);
    assert!(recorder.has_unsaved_changes());

    // Withdrawing a yellow also withdraws the red it implied
    let rebooked = recorder
        .record_player_event(TeamId(VISITING), PlayerId(25), EventType::YellowCard, 1)
        .unwrap();
    assert_eq!(rebooked.red_cards, 0);

    recorder.finalize().await.unwrap();
    assert!(!recorder.has_unsaved_changes());

    let sent = &fake.finalize_requests()[0];
    assert_eq!(sent.events.len(), 3);
    assert!(sent.events.iter().all(|e| e.kind != EventType::RedCard));
    assert_eq!(sent.mvp, None);
    assert_eq!((sent.home_penalties, sent.away_penalties), (Some(5), Some(4)));
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let fake = FakeLeagueApi::with_listing(five_a_side_listing());
    fake.set_stored(json!({
        "id_partido": MATCH,
        "goles_local": 2,
        "goles_visitante": 0,
        "walkover": false,
        "eventos": []
    }));
    let mut recorder = ResultRecorder::load(Arc::new(fake.clone()), MatchId(MATCH))
        .await
        .unwrap();

    let err = recorder.delete_result(false).await.unwrap_err();
    assert!(matches!(err, AppError::ConfirmationRequired(_)));
    assert!(!fake.calls().contains(&"delete_result"));
    assert_eq!(recorder.status(), ResultStatus::Finalized);

    recorder.delete_result(true).await.unwrap();
    assert_eq!(recorder.status(), ResultStatus::Draft);
    assert_eq!(recorder.draft().displayed_score(), (0, 0));
    assert!(fake.calls().contains(&"delete_result"));
}
