//! Encrypted request/response tests.

use core::task::Poll;
use ecies::{
    CipherAlgorithm, ClientState, Config, Context, Error, KdfAlgorithm, ServerState, State,
};
use proptest::prelude::*;
use rand_core::OsRng;
use weierstrass::{CurveId, DeferredAccelerator, Engine, EngineConfig, Key, NoCache};

struct Party {
    ctx: Context,
    key: Key,
}

fn engine() -> Engine<NoCache> {
    Engine::with_config(EngineConfig::default()).unwrap()
}

/// Client and server with salts exchanged.
fn handshake(engine: &Engine<NoCache>, id: CurveId, config: Config) -> (Party, Party) {
    let mut client = Party {
        ctx: Context::client(config.clone()),
        key: engine.generate_key(id, &mut OsRng).unwrap(),
    };
    let mut server = Party {
        ctx: Context::server(config),
        key: engine.generate_key(id, &mut OsRng).unwrap(),
    };
    let c = client.ctx.own_salt(&mut OsRng).unwrap();
    let s = server.ctx.own_salt(&mut OsRng).unwrap();
    client.ctx.set_peer_salt(&s).unwrap();
    server.ctx.set_peer_salt(&c).unwrap();
    (client, server)
}

fn ready<T>(poll: Poll<T>) -> T {
    match poll {
        Poll::Ready(value) => value,
        Poll::Pending => panic!("no accelerator attached"),
    }
}

fn public_half(engine: &Engine<NoCache>, key: &Key) -> Key {
    engine
        .import_x963(key.curve_id(), &key.export_x963(false).unwrap())
        .unwrap()
}

fn exchange(config: Config, id: CurveId, request: &[u8], response: &[u8]) {
    let engine = engine();
    let (mut client, mut server) = handshake(&engine, id, config);
    let client_pub = public_half(&engine, &client.key);
    let server_pub = public_half(&engine, &server.key);

    let sent = ready(
        client
            .ctx
            .encrypt(&engine, &mut client.key, &server_pub, request)
            .unwrap(),
    );
    let received = ready(
        server
            .ctx
            .decrypt(&engine, &mut server.key, &client_pub, &sent)
            .unwrap(),
    );
    assert_eq!(&received[..], request);

    let reply = ready(
        server
            .ctx
            .encrypt(&engine, &mut server.key, &client_pub, response)
            .unwrap(),
    );
    let answer = ready(
        client
            .ctx
            .decrypt(&engine, &mut client.key, &server_pub, &reply)
            .unwrap(),
    );
    assert_eq!(&answer[..], response);

    assert_eq!(client.ctx.state(), State::Client(ClientState::Done));
    assert_eq!(server.ctx.state(), State::Server(ServerState::Done));
}

#[test]
fn hkdf_aes128() {
    exchange(Config::default(), CurveId::Secp256r1, b"request", b"response");
}

#[test]
fn x963_aes256_with_info() {
    let config = Config {
        kdf: KdfAlgorithm::X963Sha256,
        cipher: CipherAlgorithm::Aes256Cbc,
        info: b"ecies test".to_vec(),
        ..Default::default()
    };
    exchange(config, CurveId::Secp384r1, &[0xa5; 100], b"");
}

#[test]
fn request_and_response_keys_differ() {
    let engine = engine();
    let (mut client, mut server) = handshake(&engine, CurveId::Secp256k1, Config::default());
    let client_pub = public_half(&engine, &client.key);
    let server_pub = public_half(&engine, &server.key);

    let msg = [0u8; 32];
    let request = ready(
        client
            .ctx
            .encrypt(&engine, &mut client.key, &server_pub, &msg)
            .unwrap(),
    );
    ready(
        server
            .ctx
            .decrypt(&engine, &mut server.key, &client_pub, &request)
            .unwrap(),
    );
    let response = ready(
        server
            .ctx
            .encrypt(&engine, &mut server.key, &client_pub, &msg)
            .unwrap(),
    );
    assert_ne!(request, response);
}

#[test]
fn different_mac_salt_is_rejected() {
    let engine = engine();
    let mut client = Party {
        ctx: Context::client(Config::default()),
        key: engine.generate_key(CurveId::Secp256r1, &mut OsRng).unwrap(),
    };
    let mut server = Party {
        ctx: Context::server(Config::default()),
        key: engine.generate_key(CurveId::Secp256r1, &mut OsRng).unwrap(),
    };
    let client_pub = public_half(&engine, &client.key);
    let server_pub = public_half(&engine, &server.key);

    // the server sees the client salt with its MAC half altered, the KDF half intact
    let c = client.ctx.own_salt(&mut OsRng).unwrap();
    let s = server.ctx.own_salt(&mut OsRng).unwrap();
    client.ctx.set_peer_salt(&s).unwrap();
    let mut altered = c;
    for byte in &mut altered[8..] {
        *byte = !*byte;
    }
    server.ctx.set_peer_salt(&altered).unwrap();

    let sent = ready(
        client
            .ctx
            .encrypt(&engine, &mut client.key, &server_pub, b"hello")
            .unwrap(),
    );
    assert_eq!(
        server
            .ctx
            .decrypt(&engine, &mut server.key, &client_pub, &sent)
            .unwrap_err(),
        Error::MacMismatch
    );
    assert_eq!(server.ctx.state(), State::Server(ServerState::PeerSaltSet));
}

#[test]
fn out_of_order_calls() {
    let engine = engine();
    let (mut client, mut server) = handshake(&engine, CurveId::Secp224r1, Config::default());
    let client_pub = public_half(&engine, &client.key);
    let server_pub = public_half(&engine, &server.key);

    // the server cannot speak first, the client cannot receive first
    assert_eq!(
        server
            .ctx
            .encrypt(&engine, &mut server.key, &client_pub, b"x")
            .unwrap_err(),
        Error::BadState
    );
    assert_eq!(
        client
            .ctx
            .decrypt(&engine, &mut client.key, &server_pub, &[0; 64])
            .unwrap_err(),
        Error::BadState
    );

    let fresh = Context::client(Config::default()).encrypt(
        &engine,
        &mut client.key,
        &server_pub,
        b"x",
    );
    assert_eq!(fresh.unwrap_err(), Error::BadState);
}

#[test]
fn short_and_corrupt_messages() {
    let engine = engine();
    let (mut client, mut server) = handshake(&engine, CurveId::Secp256r1, Config::default());
    let client_pub = public_half(&engine, &client.key);
    let server_pub = public_half(&engine, &server.key);

    assert_eq!(
        server
            .ctx
            .decrypt(&engine, &mut server.key, &client_pub, &[0; 47])
            .unwrap_err(),
        Error::MacMismatch
    );

    let mut sent = ready(
        client
            .ctx
            .encrypt(&engine, &mut client.key, &server_pub, b"payload")
            .unwrap(),
    );
    sent[0] ^= 0x80;
    assert_eq!(
        server
            .ctx
            .decrypt(&engine, &mut server.key, &client_pub, &sent)
            .unwrap_err(),
        Error::MacMismatch
    );
}

#[test]
fn accelerated_key_resumes() {
    let engine = engine();
    let (mut client, mut server) = handshake(&engine, CurveId::Secp256r1, Config::default());
    let client_pub = public_half(&engine, &client.key);
    let server_pub = public_half(&engine, &server.key);
    client.key.set_accelerator(Box::new(DeferredAccelerator::new(1)));

    let sent = loop {
        match client
            .ctx
            .encrypt(&engine, &mut client.key, &server_pub, b"offloaded")
            .unwrap()
        {
            Poll::Ready(sent) => break sent,
            Poll::Pending => {
                assert_eq!(client.ctx.state(), State::Client(ClientState::PeerSaltSet))
            }
        }
    };
    let received = ready(
        server
            .ctx
            .decrypt(&engine, &mut server.key, &client_pub, &sent)
            .unwrap(),
    );
    assert_eq!(&received[..], b"offloaded");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn arbitrary_messages(
        request in proptest::collection::vec(any::<u8>(), 0..200),
        response in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        exchange(Config::default(), CurveId::BrainpoolP256r1, &request, &response);
    }
}
