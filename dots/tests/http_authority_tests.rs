use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use dots::config::LayoutConfig;
use dots::geometry::{Edge, GridDims, Orientation};
use dots::session::{BoardSession, SessionPhase, SessionUpdate};
use dots::snapshot::Player;
use dots::sync::{
    Completion, GameAuthority, HttpAuthority, SyncError, SyncReply, SyncRequest, execute,
};
use dots::worker::SyncWorker;

/// Minimal stand-in for the game authority: accepts any unclaimed edge and alternates turns.
#[derive(Debug)]
struct StubGame {
    id: String,
    dims: GridDims,
    horizontal: Vec<u8>,
    vertical: Vec<u8>,
    current_player: u8,
    moves: Vec<Value>,
    resets: u32,
}

impl StubGame {
    fn new(id: &str, dims: GridDims) -> Self {
        Self {
            id: id.to_string(),
            dims,
            horizontal: vec![0; dims.edge_count(Orientation::Horizontal).unwrap()],
            vertical: vec![0; dims.edge_count(Orientation::Vertical).unwrap()],
            current_player: 1,
            moves: Vec::new(),
            resets: 0,
        }
    }

    fn state(&self) -> Value {
        json!({
            "rows": self.dims.rows,
            "cols": self.dims.cols,
            "horizontal_edges": self.horizontal,
            "vertical_edges": self.vertical,
            "box_owners": {},
            "scores": {"1": 0, "2": 0},
            "current_player": self.current_player,
            "game_over": false,
        })
    }
}

type Stub = Arc<Mutex<StubGame>>;

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Unknown game"})))
}

async fn get_game(Path(id): Path<String>, State(stub): State<Stub>) -> (StatusCode, Json<Value>) {
    let game = stub.lock().unwrap();
    if game.id != id {
        return not_found();
    }
    (StatusCode::OK, Json(game.state()))
}

async fn post_move(
    Path(id): Path<String>,
    State(stub): State<Stub>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut game = stub.lock().unwrap();
    if game.id != id {
        return not_found();
    }
    game.moves.push(body.clone());

    let Ok(edge) = serde_json::from_value::<Edge>(body) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Bad move"})));
    };
    let dims = game.dims;
    let flags = match edge.orientation {
        Orientation::Horizontal => &mut game.horizontal,
        Orientation::Vertical => &mut game.vertical,
    };
    match dims.edge_index(edge).and_then(|i| flags.get_mut(i)) {
        Some(flag) if *flag == 0 => *flag = 1,
        _ => return (StatusCode::BAD_REQUEST, Json(json!({"error": "Illegal move"}))),
    }
    game.current_player = 3 - game.current_player;

    let mut response = game.state();
    response["success"] = json!(true);
    response["completed_boxes"] = json!([]);
    (StatusCode::OK, Json(response))
}

async fn post_reset(Path(id): Path<String>, State(stub): State<Stub>) -> (StatusCode, Json<Value>) {
    let mut game = stub.lock().unwrap();
    if game.id != id {
        return not_found();
    }
    let resets = game.resets + 1;
    *game = StubGame::new(&id, game.dims);
    game.resets = resets;
    (StatusCode::OK, Json(json!({"success": true})))
}

async fn spawn_stub(id: &str, dims: GridDims) -> (String, Stub) {
    let stub: Stub = Arc::new(Mutex::new(StubGame::new(id, dims)));
    let router = Router::new()
        .route("/api/game/:id", get(get_game))
        .route("/api/game/:id/move", post(post_move))
        .route("/api/game/:id/reset", post(post_reset))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

#[tokio::test]
async fn load_decodes_integer_flag_snapshot() {
    let (base, _stub) = spawn_stub("default", GridDims::new(2, 3)).await;
    let authority = HttpAuthority::new(&base, "default").unwrap();

    let snapshot = authority.load().await.unwrap();
    assert_eq!(snapshot.dims(), GridDims::new(2, 3));
    assert_eq!(snapshot.edge_claimed(Edge::vertical(1, 3)), Some(false));
    assert_eq!(snapshot.current_player(), Player::One);
}

#[tokio::test]
async fn move_posts_exact_body_and_returns_post_move_state() {
    let (base, stub) = spawn_stub("default", GridDims::new(2, 2)).await;
    let authority = HttpAuthority::new(&base, "default").unwrap();

    let snapshot = authority.submit_move(Edge::horizontal(0, 0)).await.unwrap();
    assert_eq!(snapshot.edge_claimed(Edge::horizontal(0, 0)), Some(true));
    assert_eq!(snapshot.current_player(), Player::Two);
    assert!(snapshot.completed_boxes().is_empty());

    let moves = stub.lock().unwrap().moves.clone();
    assert_eq!(moves, vec![json!({"orientation": "H", "r": 0, "c": 0})]);
}

#[tokio::test]
async fn illegal_move_surfaces_status_and_reason() {
    let (base, _stub) = spawn_stub("default", GridDims::new(2, 2)).await;
    let authority = HttpAuthority::new(&base, "default").unwrap();
    authority.submit_move(Edge::vertical(1, 2)).await.unwrap();

    let err = authority.submit_move(Edge::vertical(1, 2)).await.unwrap_err();
    assert!(matches!(err, SyncError::Status { status: 400, .. }));
    assert_eq!(err.reason(), "Illegal move");
}

#[tokio::test]
async fn game_id_selects_the_path() {
    let (base, _stub) = spawn_stub("lobby", GridDims::new(1, 1)).await;

    let wrong = HttpAuthority::new(&base, "default").unwrap();
    assert!(matches!(
        wrong.load().await,
        Err(SyncError::Status { status: 404, .. })
    ));

    let right = HttpAuthority::new(&base, "lobby").unwrap();
    assert_eq!(right.load().await.unwrap().dims(), GridDims::new(1, 1));
}

#[tokio::test]
async fn reset_then_load_sees_fresh_board() {
    let (base, stub) = spawn_stub("default", GridDims::new(2, 2)).await;
    let authority = HttpAuthority::new(&base, "default").unwrap();
    authority.submit_move(Edge::horizontal(1, 1)).await.unwrap();

    authority.reset().await.unwrap();
    let snapshot = authority.load().await.unwrap();
    assert_eq!(snapshot.edge_claimed(Edge::horizontal(1, 1)), Some(false));
    assert_eq!(snapshot.current_player(), Player::One);
    assert_eq!(stub.lock().unwrap().resets, 1);
}

#[tokio::test]
async fn unreachable_authority_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let authority = HttpAuthority::new(&format!("http://{addr}"), "default").unwrap();
    let completion = execute(
        &authority,
        dots::sync::Ticket {
            epoch: Default::default(),
            request: SyncRequest::Load,
        },
    )
    .await;
    assert!(matches!(
        completion.reply,
        SyncReply::Loaded(Err(SyncError::Transport(_)))
    ));
}

async fn next_completion(worker: &mut SyncWorker) -> Completion {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(done) = worker.try_completion().unwrap() {
            return done;
        }
        assert!(Instant::now() < deadline, "sync worker did not answer");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn session_plays_and_resets_through_worker() {
    let (base, stub) = spawn_stub("default", GridDims::new(2, 2)).await;
    let mut worker = SyncWorker::start(HttpAuthority::new(&base, "default").unwrap()).unwrap();
    let mut session = BoardSession::new(LayoutConfig::default());

    worker.submit(session.begin_load()).unwrap();
    let update = session.complete(next_completion(&mut worker).await);
    assert!(matches!(update, SessionUpdate::Snapshot { resized: true }));
    assert_eq!(session.phase(), SessionPhase::InProgress);

    let edge = Edge::vertical(0, 1);
    let (x, y) = session.geometry().unwrap().edge_segment(edge).midpoint();
    worker.submit(session.clicked(x, y).unwrap()).unwrap();
    let update = session.complete(next_completion(&mut worker).await);
    assert!(matches!(update, SessionUpdate::Snapshot { resized: false }));
    assert_eq!(session.snapshot().unwrap().edge_claimed(edge), Some(true));
    assert_eq!(session.snapshot().unwrap().current_player(), Player::Two);

    // Clicking the now-claimed edge produces no request at all.
    assert_eq!(session.clicked(x, y), None);
    assert_eq!(stub.lock().unwrap().moves.len(), 1);

    worker.submit(session.begin_reset()).unwrap();
    let SessionUpdate::FollowUp(load) = session.complete(next_completion(&mut worker).await)
    else {
        panic!("reset should request a reload");
    };
    worker.submit(load).unwrap();
    session.complete(next_completion(&mut worker).await);
    assert_eq!(session.snapshot().unwrap().edge_claimed(edge), Some(false));
    assert_eq!(session.phase(), SessionPhase::InProgress);
}
