// src/handlers/feed.rs
use std::sync::Arc;

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::{Message, MessageStream, Session};
use futures_util::StreamExt as _;
use log::{debug, error, info};
use tokio::time;
use uuid::Uuid;

use crate::aggregate;
use crate::community::HttpCommunityClient;
use crate::config::Config;
use crate::status::StatusClient;

/// Upgrade to a WebSocket and hand the connection its own push loop. Every
/// connection polls the upstreams independently; there is no shared cache
/// or coalescing between clients.
pub async fn feed(
    req: HttpRequest,
    stream: web::Payload,
    config: web::Data<Config>,
    community: web::Data<HttpCommunityClient>,
    status: web::Data<StatusClient>,
) -> Result<HttpResponse, Error> {
    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    actix_web::rt::spawn(push_loop(
        session,
        msg_stream,
        config.into_inner(),
        community.into_inner(),
        status.into_inner(),
    ));

    Ok(response)
}

async fn push_loop(
    mut session: Session,
    mut msg_stream: MessageStream,
    config: Arc<Config>,
    community: Arc<HttpCommunityClient>,
    status: Arc<StatusClient>,
) {
    let conn_id = Uuid::new_v4();
    info!("Client {} connected", conn_id);

    // The first tick completes immediately, so the client gets a snapshot
    // on open with no initial delay.
    let mut interval = time::interval(config.update_interval());

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = aggregate::combined_snapshot(
                    community.as_ref(),
                    status.as_ref(),
                    &config.guild_id,
                    &config.fivem_server_id,
                )
                .await;

                let text = match serde_json::to_string(&snapshot) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to serialize snapshot for {}: {}", conn_id, e);
                        continue;
                    }
                };

                // A half-closed peer just drops this frame; the timer keeps
                // running until an explicit close comes through.
                if session.text(text).await.is_err() {
                    debug!("Dropped frame for half-closed client {}", conn_id);
                }
            }

            msg = msg_stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(bytes))) => {
                        let _ = session.pong(&bytes).await;
                    }
                    Some(Ok(Message::Close(reason))) => {
                        debug!("Client {} closed: {:?}", conn_id, reason);
                        break;
                    }
                    // Inbound text/binary is not part of the protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Protocol error from client {}: {}", conn_id, e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // Dropping out of the loop releases the interval; nothing re-arms it.
    let _ = session.close(None).await;
    info!("Client {} disconnected", conn_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_http::ws::{Frame, Message as WsMessage};
    use actix_web::App;
    use futures_util::{SinkExt as _, StreamExt as _};
    use serde_json::{json, Value};
    use std::time::{Duration, Instant};

    /// Stands in for both upstreams: Discord-shaped roster routes and the
    /// FiveM-shaped registry route. Guild "broken" fails roster reads.
    fn start_upstreams() -> actix_test::TestServer {
        actix_test::start(|| {
            App::new()
                .route(
                    "/guilds/{id}",
                    web::get().to(|path: web::Path<String>| async move {
                        if path.as_str() == "broken" {
                            return HttpResponse::InternalServerError().finish();
                        }
                        HttpResponse::Ok().json(json!({"member_count": 10}))
                    }),
                )
                .route(
                    "/guilds/{id}/members",
                    web::get().to(|| async {
                        HttpResponse::Ok().json(json!([
                            {"roles": ["r-hero"], "presence": "online"},
                            {"roles": ["r-hero"], "presence": "idle"},
                            {"roles": ["r-master"], "presence": "dnd"},
                            {"roles": [], "presence": "online"},
                            {"roles": [], "presence": "offline"},
                            {"roles": []},
                            {"roles": []},
                            {"roles": []},
                            {"roles": []},
                            {"roles": []}
                        ]))
                    }),
                )
                .route(
                    "/guilds/{id}/roles",
                    web::get().to(|| async {
                        HttpResponse::Ok().json(json!([
                            {"id": "r-master", "name": "MASTER"},
                            {"id": "r-hero", "name": "HERO"}
                        ]))
                    }),
                )
                .route(
                    "/api/servers/single/{id}",
                    web::get().to(|| async {
                        HttpResponse::Ok().json(json!({"Data": {"clients": 17}}))
                    }),
                )
        })
    }

    fn start_app(config: Config) -> actix_test::TestServer {
        actix_test::start(move || {
            let community = web::Data::new(HttpCommunityClient::new(
                config.community_api_url.clone(),
                config.community_token.clone(),
            ));
            let status = web::Data::new(StatusClient::new(&config));
            App::new()
                .app_data(community)
                .app_data(status)
                .app_data(web::Data::new(config.clone()))
                .route("/ws", web::get().to(feed))
        })
    }

    fn test_config(upstreams: &actix_test::TestServer, guild_id: &str, interval_ms: u64) -> Config {
        let mut config = Config::default();
        config.guild_id = guild_id.to_string();
        config.fivem_server_id = "abc123".to_string();
        config.registry_base_url = upstreams.url("").trim_end_matches('/').to_string();
        config.community_api_url = upstreams.url("").trim_end_matches('/').to_string();
        config.update_interval_ms = interval_ms;
        config
    }

    fn expected_snapshot() -> Value {
        json!({
            "count": 10,
            "onlineCount": 4,
            "rolesBasedCount": {"MASTER": 1, "HERO": 2},
            "getFivemCount": {"Data": {"clients": 17}}
        })
    }

    async fn next_text(
        ws: &mut (impl futures_util::Stream<
            Item = Result<Frame, actix_http::ws::ProtocolError>,
        > + Unpin),
    ) -> Value {
        loop {
            match ws.next().await {
                Some(Ok(Frame::Text(bytes))) => {
                    return serde_json::from_slice(&bytes).unwrap();
                }
                Some(Ok(Frame::Ping(_))) => continue,
                other => panic!("expected text frame, got {:?}", other),
            }
        }
    }

    #[actix_web::test]
    async fn pushes_snapshot_on_open_and_every_interval() {
        let upstreams = start_upstreams();
        let mut srv = start_app(test_config(&upstreams, "g1", 150));
        let mut ws = srv.ws_at("/ws").await.unwrap();

        // Immediate snapshot, then timed ones with identical content.
        for _ in 0..3 {
            assert_eq!(next_text(&mut ws).await, expected_snapshot());
        }

        ws.send(WsMessage::Close(None)).await.unwrap();

        // After close the server may echo a close frame, but no further
        // snapshots arrive.
        while let Some(Ok(frame)) = ws.next().await {
            match frame {
                Frame::Close(_) => break,
                Frame::Text(_) => panic!("received snapshot after close"),
                _ => {}
            }
        }
    }

    #[actix_web::test]
    async fn first_snapshot_is_sent_without_initial_delay() {
        let upstreams = start_upstreams();
        // Interval far longer than the assertion window.
        let mut srv = start_app(test_config(&upstreams, "g1", 30_000));
        let started = Instant::now();

        let mut ws = srv.ws_at("/ws").await.unwrap();
        next_text(&mut ws).await;

        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[actix_web::test]
    async fn roster_failure_is_delivered_as_error_shape() {
        let upstreams = start_upstreams();
        let mut srv = start_app(test_config(&upstreams, "broken", 150));
        let mut ws = srv.ws_at("/ws").await.unwrap();

        assert_eq!(
            next_text(&mut ws).await,
            json!({"error": "Error fetching member count"})
        );
    }

    #[actix_web::test]
    async fn connections_tick_independently() {
        let upstreams = start_upstreams();
        let mut srv = start_app(test_config(&upstreams, "g1", 150));

        let mut first = srv.ws_at("/ws").await.unwrap();
        let mut second = srv.ws_at("/ws").await.unwrap();

        next_text(&mut first).await;
        next_text(&mut second).await;

        // Closing one connection must not disturb the other's cadence.
        first.send(WsMessage::Close(None)).await.unwrap();
        drop(first);

        for _ in 0..2 {
            assert_eq!(next_text(&mut second).await, expected_snapshot());
        }
    }
}
