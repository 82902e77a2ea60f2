//! Integration tests for inbound traffic: state tracking, events and
//! automatic replies.

mod common;

use std::time::Duration;

use azmate::proto::Role;
use azmate::{Event, EventKind};
use common::{config, connect, next_event};
use tokio::time::Instant;

#[tokio::test]
async fn test_join_names_and_channel_message() {
    let (client, mut server, mut events) = connect(config()).await;

    server.send(":me!me@host JOIN #rust").await;
    match next_event(&mut events, EventKind::Join).await {
        Event::Join { channel, user } => {
            assert_eq!(channel.name(), "#rust");
            assert_eq!(user.nick(), "me");
        }
        other => panic!("unexpected event {other:?}"),
    }

    server
        .send(":irc.test 353 me = #rust :@me +alice bob")
        .await;
    server
        .send(":irc.test 366 me #rust :End of /NAMES list.")
        .await;
    server
        .send(":alice!ali@alice.host PRIVMSG #rust :hello there")
        .await;

    match next_event(&mut events, EventKind::Message).await {
        Event::Message {
            sender,
            channel,
            text,
        } => {
            assert_eq!(sender.nick(), "alice");
            assert_eq!(sender.hostname(), Some("alice.host"));
            assert_eq!(channel.map(|c| c.name().to_owned()).as_deref(), Some("#rust"));
            assert_eq!(text, "hello there");
        }
        other => panic!("unexpected event {other:?}"),
    }

    let channel = client.channel("#rust").expect("joined channel");
    assert_eq!(channel.member_count(), 3);
    assert!(channel.member("me").unwrap().has_operator());
    assert!(channel.member("alice").unwrap().has_voice());
    assert_eq!(channel.member("bob").unwrap().role(), None);
}

#[tokio::test]
async fn test_private_message_and_formatting() {
    let (_client, mut server, mut events) = connect(config()).await;

    server
        .send(":bob!b@b.host PRIVMSG me :\x02bold\x02 and \x0304,01red\x03")
        .await;
    match next_event(&mut events, EventKind::Message).await {
        Event::Message { channel, text, .. } => {
            assert!(channel.is_none());
            assert_eq!(text, "bold and red");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_voice_two_members_refreshes_names() {
    let (client, mut server, mut events) = connect(config()).await;
    server.send(":me!me@host JOIN #rust").await;
    server
        .send(":irc.test 353 me = #rust :@me alice bob")
        .await;
    server.send(":me!me@host MODE #rust +v alice bob").await;

    let mut voiced = Vec::new();
    for _ in 0..2 {
        match next_event(&mut events, EventKind::RoleGranted(Role::Voice)).await {
            Event::RoleGranted { target, setter, .. } => {
                assert_eq!(setter.map(|s| s.nick().to_owned()).as_deref(), Some("me"));
                voiced.push(target.nick().to_owned());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(voiced, ["alice", "bob"]);
    server.expect("NAMES #rust").await;

    let channel = client.channel("#rust").unwrap();
    assert!(channel.member("alice").unwrap().has_voice());
    assert!(channel.member("bob").unwrap().has_voice());
}

#[tokio::test]
async fn test_nick_change_keeps_roles() {
    let (client, mut server, mut events) = connect(config()).await;
    server.send(":me!me@host JOIN #rust").await;
    server.send(":irc.test 353 me = #rust :me @alice").await;
    server.send(":alice!a@host NICK alicia").await;

    match next_event(&mut events, EventKind::NickChanged).await {
        Event::NickChanged { user, new_nick } => {
            assert_eq!(user.nick(), "alice");
            assert_eq!(new_nick, "alicia");
        }
        other => panic!("unexpected event {other:?}"),
    }
    let channel = client.channel("#rust").unwrap();
    assert!(!channel.contains("alice"));
    assert!(channel.member("alicia").unwrap().has_operator());

    server.send(":me!me@host NICK me2").await;
    next_event(&mut events, EventKind::NickChanged).await;
    assert_eq!(client.current_nick(), "me2");
}

#[tokio::test]
async fn test_quit_and_kick_update_rosters() {
    let (client, mut server, mut events) = connect(config()).await;
    server.send(":me!me@host JOIN #a").await;
    server.send(":me!me@host JOIN #b").await;
    server.send(":irc.test 353 me = #a :me carol").await;
    server.send(":irc.test 353 me = #b :me carol").await;
    server.send(":carol!c@host QUIT :gone fishing").await;

    match next_event(&mut events, EventKind::Quit).await {
        Event::Quit { user, message } => {
            assert_eq!(user.nick(), "carol");
            assert_eq!(message.as_deref(), Some("gone fishing"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(!client.channel("#a").unwrap().contains("carol"));
    assert!(!client.channel("#b").unwrap().contains("carol"));

    server.send(":op!o@host KICK #b me :out").await;
    match next_event(&mut events, EventKind::Kick).await {
        Event::Kick {
            channel,
            kicker,
            kicked,
            reason,
        } => {
            assert_eq!(channel.name(), "#b");
            assert_eq!(kicker.nick(), "op");
            assert_eq!(kicked.nick(), "me");
            assert_eq!(reason.as_deref(), Some("out"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(client.channel("#b").is_none());
    assert!(client.channel("#a").is_some());
}

#[tokio::test]
async fn test_topic_reply_and_change() {
    let (client, mut server, mut events) = connect(config()).await;
    server.send(":me!me@host JOIN #rust").await;
    server
        .send(":irc.test 332 me #rust :Welcome to #rust")
        .await;

    match next_event(&mut events, EventKind::TopicChanged).await {
        Event::TopicChanged { setter, topic, .. } => {
            assert!(setter.is_none());
            assert_eq!(topic, "Welcome to #rust");
        }
        other => panic!("unexpected event {other:?}"),
    }

    server.send(":alice!a@host TOPIC #rust :New topic").await;
    next_event(&mut events, EventKind::TopicChanged).await;
    assert_eq!(
        client.channel("#rust").unwrap().topic().as_deref(),
        Some("New topic")
    );
}

#[tokio::test]
async fn test_motd_collected() {
    let (_client, mut server, mut events) = connect(config()).await;
    server.send(":irc.test 375 me :- irc.test MOTD -").await;
    server.send(":irc.test 372 me :- first").await;
    server.send(":irc.test 372 me :- second").await;
    server.send(":irc.test 376 me :End of MOTD").await;

    match next_event(&mut events, EventKind::Motd).await {
        Event::Motd { text } => assert_eq!(text, "- first\n- second\n"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_ping_after_registration() {
    let (_client, mut server, _events) = connect(config()).await;
    server.send("PING :irc.test").await;
    server.expect("PONG :irc.test").await;
}

#[tokio::test]
async fn test_ctcp_requests_are_answered() {
    let mut config = config();
    config.connection.version = "TestBot 2.0".into();
    let (_client, mut server, _events) = connect(config).await;

    server
        .send(":peer!p@peer.host PRIVMSG me :\x01VERSION\x01")
        .await;
    server.expect("NOTICE peer :\x01VERSION TestBot 2.0\x01").await;

    server
        .send(":peer!p@peer.host PRIVMSG me :\x01PING 1700000000\x01")
        .await;
    server.expect("NOTICE peer :\x01PING 1700000000\x01").await;

    server
        .send(":peer!p@peer.host PRIVMSG me :\x01BOGUS\x01")
        .await;
    let reply = server.recv().await;
    assert!(reply.starts_with("NOTICE peer :\x01ERRMSG"), "{reply:?}");
}

#[tokio::test]
async fn test_ctcp_reply_event() {
    let (client, mut server, mut events) = connect(config()).await;
    client.ctcp_version("peer").unwrap();
    server.expect("PRIVMSG peer :\x01VERSION\x01").await;

    server
        .send(":peer!p@peer.host NOTICE me :\x01VERSION OtherClient 1.2\x01")
        .await;
    match next_event(&mut events, EventKind::CtcpReply).await {
        Event::CtcpReply {
            sender,
            command,
            args,
        } => {
            assert_eq!(sender.nick(), "peer");
            assert_eq!(command, "VERSION");
            assert_eq!(args.as_deref(), Some("OtherClient 1.2"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_lines_reach_subscribers() {
    let (_client, mut server, mut events) = connect(config()).await;
    server.send(":irc.test 251 me :There are 3 users").await;

    match next_event(&mut events, EventKind::Unknown).await {
        Event::Unknown { packet } => assert_eq!(packet.numeric, Some(251)),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_outgoing_lines_are_spaced() {
    let mut config = config();
    config.connection.message_delay_ms = 200;
    let (client, mut server, _events) = connect(config).await;

    for text in ["one", "two", "three"] {
        client.privmsg("#rust", text).unwrap();
    }

    let mut arrivals = Vec::new();
    for text in ["one", "two", "three"] {
        server.expect(&format!("PRIVMSG #rust :{text}")).await;
        arrivals.push(Instant::now());
    }
    for pair in arrivals.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(200));
    }
}

#[tokio::test]
async fn test_delay_change_applies_to_next_line() {
    let (client, mut server, _events) = connect(config()).await;
    client.set_message_delay(Duration::from_millis(50));
    client.privmsg("bob", "hi").unwrap();
    server.expect("PRIVMSG bob :hi").await;
    assert_eq!(client.config().connection.message_delay_ms, 50);
}
