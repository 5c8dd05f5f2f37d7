use minefield_common::models::CreateResponse;
use minefield_server::{build, cleanup::cleanup_games, config::ServerConfig, logic::Games};
use rocket::{
    http::{ContentType, Status},
    local::blocking::Client,
};

fn client(games_per_minute: u32) -> Client {
    let config = ServerConfig {
        games_per_minute,
        ..ServerConfig::default()
    };
    Client::tracked(build(config)).expect("valid rocket instance")
}

fn create(client: &Client, body: &str) -> Status {
    client
        .post("/create")
        .header(ContentType::JSON)
        .body(body)
        .dispatch()
        .status()
}

#[test]
fn creates_a_game_for_each_level() {
    let client = client(10);

    for level in 1..=3 {
        let response = client
            .post("/create")
            .header(ContentType::JSON)
            .body(format!(r#"{{"level":{}}}"#, level))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        let created: CreateResponse = response.into_json().expect("create response");
        assert!(created.id.len() >= 5);
    }

    let games = client.rocket().state::<Games>().expect("games state");
    assert_eq!(games.len(), 3);
}

#[test]
fn missing_level_defaults_to_the_first() {
    let client = client(10);
    assert_eq!(create(&client, "{}"), Status::Ok);
}

#[test]
fn unknown_levels_are_unprocessable() {
    let client = client(10);
    assert_eq!(create(&client, r#"{"level":0}"#), Status::UnprocessableEntity);
    assert_eq!(create(&client, r#"{"level":4}"#), Status::UnprocessableEntity);

    let games = client.rocket().state::<Games>().expect("games state");
    assert!(games.is_empty());
}

#[test]
fn game_creation_is_rate_limited() {
    let client = client(2);
    assert_eq!(create(&client, r#"{"level":1}"#), Status::Ok);
    assert_eq!(create(&client, r#"{"level":2}"#), Status::Ok);
    assert_eq!(create(&client, r#"{"level":3}"#), Status::TooManyRequests);
}

#[test]
fn fresh_games_survive_cleanup() {
    let client = client(10);
    assert_eq!(create(&client, r#"{"level":3}"#), Status::Ok);

    let games = client.rocket().state::<Games>().expect("games state");
    assert_eq!(cleanup_games(games, 600, 86400), 0);
    assert_eq!(games.len(), 1);
}
