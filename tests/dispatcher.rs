//! End-to-end dispatcher scenarios driven through the sans-IO state.

use slirc_client::client::{Action, ClientState};
use slirc_client::{ClientOptions, Event, EventKind, Message};

fn options() -> ClientOptions {
    ClientOptions::new("irc.example.net", "bot")
}

/// Feed raw lines and collect every action they produced.
fn feed(state: &mut ClientState, lines: &[&str]) -> Vec<Action> {
    lines
        .iter()
        .flat_map(|line| {
            let msg: Message = line.parse().expect("valid line");
            state.handle(&msg)
        })
        .collect()
}

fn sent(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Send(cmd) => Some(cmd.to_line()),
            Action::Emit(_) => None,
        })
        .collect()
}

fn events(actions: &[Action]) -> Vec<Event> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Emit(e) => Some(e.clone()),
            Action::Send(_) => None,
        })
        .collect()
}

fn kinds(actions: &[Action]) -> Vec<EventKind> {
    events(actions).iter().map(Event::kind).collect()
}

/// A registered client sitting in `#test` with alice.
fn in_channel() -> ClientState {
    let mut state = ClientState::new(options());
    state.registration();
    feed(
        &mut state,
        &[
            ":srv 001 bot :Welcome to the network bot!bot@127.0.0.1",
            ":srv 005 bot CHANMODES=beI,k,l,imnpst PREFIX=(ov)@+ CHANTYPES=#& :are supported",
            ":bot!bot@127.0.0.1 JOIN #test",
            ":srv 353 bot = #test :@bot alice",
            ":srv 366 bot #test :End of /NAMES list.",
        ],
    );
    state
}

#[test]
fn nick_collision_appends_counter() {
    let mut state = ClientState::new(options());
    let registration: Vec<String> = state.registration().iter().map(|c| c.to_line()).collect();
    assert_eq!(registration, vec!["NICK bot", "USER slircbot 8 * :slirc IRC client"]);

    let actions = feed(&mut state, &[":srv 433 * bot :Nickname is already in use"]);
    assert_eq!(sent(&actions), vec!["NICK bot1"]);
    assert!(events(&actions).is_empty());
    assert_eq!(state.nick(), "bot1");

    let actions = feed(&mut state, &[":srv 001 bot1 :Welcome bot1!bot@host"]);
    assert_eq!(kinds(&actions), vec![EventKind::Registered]);
    assert_eq!(sent(&actions), vec!["WHOIS bot1"]);
    assert_eq!(state.max_line_length(), 497 - 4 - "bot1!bot@host".len());
}

#[test]
fn ctcp_action_is_not_a_message() {
    let mut state = in_channel();
    let actions = feed(&mut state, &[":alice!a@h PRIVMSG #test :\x01ACTION waves\x01"]);
    assert_eq!(
        kinds(&actions),
        vec![EventKind::Ctcp, EventKind::CtcpPrivmsg, EventKind::Action]
    );
    assert_eq!(
        events(&actions)[2],
        Event::Action {
            from: Some("alice".into()),
            to: "#test".into(),
            text: "waves".into(),
        }
    );
}

#[test]
fn channel_message_events() {
    let mut state = in_channel();
    let actions = feed(&mut state, &[":alice!a@h PRIVMSG #test :hello"]);
    assert_eq!(
        kinds(&actions),
        vec![EventKind::Message, EventKind::ChannelMessage]
    );

    let actions = feed(&mut state, &[":alice!a@h PRIVMSG bot :psst"]);
    assert_eq!(kinds(&actions), vec![EventKind::Message, EventKind::Pm]);

    let actions = feed(&mut state, &[":alice!a@h NOTICE #test :note"]);
    assert_eq!(kinds(&actions), vec![EventKind::Notice]);
}

#[test]
fn channel_names_are_case_insensitive() {
    let mut state = ClientState::new(options());
    feed(
        &mut state,
        &[
            ":bot!b@h JOIN #Foo",
            ":bot!b@h JOIN #foo",
            ":srv 332 bot #FOO :the topic",
            ":srv 333 bot #foo alice 1700000000",
        ],
    );
    assert_eq!(state.channels().len(), 1);
    let channel = state.channel("#fOO").expect("joined");
    assert_eq!(channel.name, "#Foo");
    assert_eq!(channel.topic.as_deref(), Some("the topic"));
    assert_eq!(channel.topic_by.as_deref(), Some("alice"));

    // rfc1459 folds []\~ into {}|^
    feed(&mut state, &[":bot!b@h JOIN #[a]"]);
    assert!(state.channel("#{A}").is_some());
}

#[test]
fn casemapping_from_isupport_reindexes() {
    let mut state = ClientState::new(options());
    feed(&mut state, &[":bot!b@h JOIN #[a]"]);
    feed(&mut state, &[":srv 005 bot CASEMAPPING=ascii :are supported"]);
    assert!(state.channel("#[A]").is_some());
    assert!(state.channel("#{a}").is_none());
}

#[test]
fn mode_sequence_updates_state_and_emits_per_letter() {
    let mut state = in_channel();
    let actions = feed(&mut state, &[":op!o@h MODE #test +o-v+b alice alice *!*@bad"]);
    let evs = events(&actions);
    assert_eq!(evs.len(), 3);
    assert_eq!(
        evs[0],
        Event::ModeAdded {
            channel: "#test".into(),
            by: Some("op".into()),
            mode: 'o',
            arg: Some("alice".into()),
        }
    );
    assert!(matches!(&evs[1], Event::ModeRemoved { mode: 'v', .. }));
    assert!(matches!(&evs[2], Event::ModeAdded { mode: 'b', arg: Some(a), .. } if a == "*!*@bad"));

    let channel = state.channel("#test").unwrap();
    assert_eq!(channel.users["alice"], "@");
    assert_eq!(channel.mode_params[&'b'], vec!["*!*@bad"]);

    feed(
        &mut state,
        &[
            ":op!o@h MODE #test +b *!*@worse",
            ":op!o@h MODE #test -b *!*@bad",
        ],
    );
    let channel = state.channel("#test").unwrap();
    assert_eq!(channel.mode_params[&'b'], vec!["*!*@worse"]);
    assert!(channel.mode.contains('b'));

    feed(&mut state, &[":op!o@h MODE #test -b *!*@worse"]);
    let channel = state.channel("#test").unwrap();
    assert!(!channel.mode.contains('b'));
    assert!(!channel.mode_params.contains_key(&'b'));
}

#[test]
fn mode_key_and_limit() {
    let mut state = in_channel();
    feed(&mut state, &[":op!o@h MODE #test +ntkl secret 25"]);
    let channel = state.channel("#test").unwrap();
    assert_eq!(channel.mode, "ntkl");
    assert_eq!(channel.mode_params[&'k'], vec!["secret"]);
    assert_eq!(channel.mode_params[&'l'], vec!["25"]);

    // Known edge case: -l takes no parameter, so the next letter gets "alice".
    let actions = feed(&mut state, &[":op!o@h MODE #test -l+v alice"]);
    assert!(matches!(&events(&actions)[0], Event::ModeRemoved { mode: 'l', arg: None, .. }));
    let channel = state.channel("#test").unwrap();
    assert!(!channel.mode.contains('l'));
    assert_eq!(channel.users["alice"], "+");

    feed(&mut state, &[":op!o@h MODE #test -k secret"]);
    assert!(!state.channel("#test").unwrap().mode.contains('k'));
}

#[test]
fn unknown_mode_letters_are_skipped() {
    let mut state = in_channel();
    let actions = feed(&mut state, &[":op!o@h MODE #test +Zo alice"]);
    assert_eq!(events(&actions).len(), 1);
    assert_eq!(state.channel("#test").unwrap().users["alice"], "@");
}

#[test]
fn mode_on_unknown_channel_is_ignored() {
    let mut state = in_channel();
    let actions = feed(&mut state, &[":op!o@h MODE #elsewhere +o alice"]);
    assert!(actions.is_empty());
}

#[test]
fn names_reply_then_mode_query() {
    let mut state = ClientState::new(options());
    feed(&mut state, &[":bot!b@h JOIN #c"]);
    let actions = feed(
        &mut state,
        &[
            ":srv 353 bot = #c :@bot +v_guy plain",
            ":srv 366 bot #c :End of /NAMES list.",
        ],
    );
    assert_eq!(sent(&actions), vec!["MODE #c"]);
    match &events(&actions)[0] {
        Event::Names { channel, users } => {
            assert_eq!(channel, "#c");
            assert_eq!(users["bot"], "@");
            assert_eq!(users["v_guy"], "+");
            assert_eq!(users["plain"], "");
        }
        other => panic!("unexpected event {:?}", other),
    }

    feed(
        &mut state,
        &[
            ":srv 324 bot #c +nt",
            ":srv 329 bot #c 1700000000",
        ],
    );
    let channel = state.channel("#c").unwrap();
    assert_eq!(channel.mode, "nt");
    assert_eq!(
        channel.created_at().map(|t| t.timestamp()),
        Some(1_700_000_000)
    );
}

#[test]
fn whois_accumulates_until_end() {
    let mut state = in_channel();
    let partial = feed(
        &mut state,
        &[
            ":srv 311 bot alice ~a host.example * :Alice Liddell",
            ":srv 319 bot alice :@#a +#b",
            ":srv 312 bot alice irc.example :Example server",
            ":srv 313 bot alice :is an IRC operator",
            ":srv 317 bot alice 42 1700000000 :seconds idle",
            ":srv 330 bot alice alice_acct :is logged in as",
            ":srv 301 bot alice :gone fishing",
        ],
    );
    assert!(partial.is_empty());

    let actions = feed(&mut state, &[":srv 318 bot alice :End of /WHOIS list."]);
    let record = match &events(&actions)[0] {
        Event::Whois(record) => record.clone(),
        other => panic!("unexpected event {:?}", other),
    };
    assert_eq!(record.nick, "alice");
    assert_eq!(record.user.as_deref(), Some("~a"));
    assert_eq!(record.host.as_deref(), Some("host.example"));
    assert_eq!(record.realname.as_deref(), Some("Alice Liddell"));
    assert_eq!(record.channels, vec!["@#a", "+#b"]);
    assert_eq!(record.server.as_deref(), Some("irc.example"));
    assert_eq!(record.server_info.as_deref(), Some("Example server"));
    assert_eq!(record.operator.as_deref(), Some("is an IRC operator"));
    assert_eq!(record.idle.as_deref(), Some("42"));
    assert_eq!(record.account.as_deref(), Some("alice_acct"));
    assert_eq!(record.account_info.as_deref(), Some("is logged in as"));
    assert_eq!(record.away.as_deref(), Some("gone fishing"));
}

#[test]
fn away_without_pending_whois_is_dropped() {
    let mut state = in_channel();
    assert!(feed(&mut state, &[":srv 301 bot carol :on holiday"]).is_empty());
    let actions = feed(&mut state, &[":srv 318 bot carol :End of /WHOIS list."]);
    match &events(&actions)[0] {
        Event::Whois(record) => {
            assert_eq!(record.nick, "carol");
            assert_eq!(record.away, None);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn who_reply_emits_record() {
    let mut state = in_channel();
    let actions = feed(
        &mut state,
        &[":srv 352 bot #test ~d dhost srv.example dave H :3 Dave Real"],
    );
    match &events(&actions)[0] {
        Event::Whois(record) => {
            assert_eq!(record.nick, "dave");
            assert_eq!(record.user.as_deref(), Some("~d"));
            assert_eq!(record.host.as_deref(), Some("dhost"));
            assert_eq!(record.server.as_deref(), Some("srv.example"));
            assert_eq!(record.realname.as_deref(), Some("Dave Real"));
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn channel_list() {
    let mut state = in_channel();
    let actions = feed(
        &mut state,
        &[
            ":srv 321 bot Channel :Users Name",
            ":srv 322 bot #a 5 :topic a",
            ":srv 322 bot #b 7 :topic b",
            ":srv 323 bot :End of /LIST",
        ],
    );
    assert_eq!(
        kinds(&actions),
        vec![
            EventKind::ChannelListStart,
            EventKind::ChannelListItem,
            EventKind::ChannelListItem,
            EventKind::ChannelList,
        ]
    );
    match &events(&actions)[3] {
        Event::ChannelList(list) => {
            assert_eq!(list.len(), 2);
            assert_eq!(list[1].name, "#b");
            assert_eq!(list[1].users, "7");
            assert_eq!(list[1].topic, "topic b");
        }
        other => panic!("unexpected event {:?}", other),
    }

    // a new listing starts empty
    let actions = feed(
        &mut state,
        &[":srv 321 bot Channel :Users Name", ":srv 323 bot :End of /LIST"],
    );
    assert_eq!(events(&actions)[1], Event::ChannelList(Vec::new()));
}

#[test]
fn nick_change_migrates_users() {
    let mut state = in_channel();
    feed(
        &mut state,
        &[
            ":bot!b@h JOIN #other",
            ":alice!a@h JOIN #other",
            ":bot!b@h JOIN #third",
        ],
    );
    let actions = feed(&mut state, &[":alice!a@h NICK alicia"]);
    assert_eq!(
        events(&actions),
        vec![Event::Nick {
            old: "alice".into(),
            new: "alicia".into(),
            channels: vec!["#test".into(), "#other".into()],
        }]
    );
    for name in ["#test", "#other"] {
        let channel = state.channel(name).unwrap();
        assert!(channel.users.contains_key("alicia"));
        assert!(!channel.users.contains_key("alice"));
    }
    assert_eq!(state.channel("#test").unwrap().users["alicia"], "");

    let before = state.max_line_length();
    feed(&mut state, &[":bot!b@h NICK robot"]);
    assert_eq!(state.nick(), "robot");
    assert_eq!(state.max_line_length(), before - 2);
}

#[test]
fn part_kick_quit_kill() {
    let mut state = in_channel();
    feed(
        &mut state,
        &[
            ":bot!b@h JOIN #other",
            ":alice!a@h JOIN #other",
            ":carol!c@h JOIN #test",
            ":dave!d@h JOIN #test",
        ],
    );

    let actions = feed(&mut state, &[":carol!c@h PART #test :bye"]);
    assert_eq!(
        events(&actions),
        vec![Event::Part {
            channel: "#test".into(),
            nick: "carol".into(),
            reason: Some("bye".into()),
        }]
    );
    assert!(!state.channel("#test").unwrap().users.contains_key("carol"));

    let actions = feed(&mut state, &[":op!o@h KICK #test dave :behave"]);
    assert!(matches!(&events(&actions)[0], Event::Kick { nick, by: Some(by), .. } if nick == "dave" && by == "op"));
    assert!(!state.channel("#test").unwrap().users.contains_key("dave"));

    let actions = feed(&mut state, &[":alice!a@h QUIT :Quit: leaving"]);
    assert_eq!(
        events(&actions),
        vec![Event::Quit {
            nick: "alice".into(),
            reason: Some("Quit: leaving".into()),
            channels: vec!["#test".into(), "#other".into()],
        }]
    );

    feed(&mut state, &[":erin!e@h JOIN #other"]);
    let actions = feed(&mut state, &[":srv KILL erin :too noisy"]);
    assert!(matches!(&events(&actions)[0], Event::Kill { nick, channels, .. } if nick == "erin" && channels == &vec!["#other".to_string()]));

    feed(&mut state, &[":bot!b@h PART #other"]);
    assert!(state.channel("#other").is_none());
}

#[test]
fn self_kick_rejoins_when_enabled() {
    let mut opts = options();
    opts.auto_rejoin = true;
    let mut state = ClientState::new(opts);
    feed(&mut state, &[":bot!b@h JOIN #test"]);
    let actions = feed(&mut state, &[":op!o@h KICK #test bot :out"]);
    assert_eq!(kinds(&actions), vec![EventKind::Kick]);
    assert_eq!(sent(&actions), vec!["JOIN #test"]);
    assert!(state.channel("#test").is_none());

    let mut state = in_channel();
    let actions = feed(&mut state, &[":op!o@h KICK #test bot :out"]);
    assert!(sent(&actions).is_empty());
}

#[test]
fn motd_then_auto_join() {
    let mut opts = options();
    opts.channels = vec!["#a".into(), "#b key".into()];
    let mut state = ClientState::new(opts);
    let actions = feed(
        &mut state,
        &[
            ":srv 375 bot :- irc.example Message of the Day -",
            ":srv 372 bot :- be nice",
            ":srv 376 bot :End of /MOTD command.",
        ],
    );
    assert_eq!(
        events(&actions),
        vec![Event::Motd(
            "- irc.example Message of the Day -\n- be nice\nEnd of /MOTD command.\n".into()
        )]
    );
    assert_eq!(sent(&actions), vec!["JOIN #a", "JOIN #b key"]);

    let actions = feed(&mut state, &[":srv 422 bot :MOTD File is missing"]);
    assert_eq!(sent(&actions), vec!["JOIN #a", "JOIN #b key"]);
}

#[test]
fn sasl_plain_flow() {
    let mut opts = options();
    opts.sasl = true;
    opts.password = Some("hunter2".into());
    let mut state = ClientState::new(opts);

    let registration: Vec<String> = state.registration().iter().map(|c| c.to_line()).collect();
    assert_eq!(registration[0], "CAP REQ sasl");

    let actions = feed(&mut state, &[":srv CAP * ACK :sasl"]);
    assert_eq!(sent(&actions), vec!["AUTHENTICATE PLAIN"]);

    let actions = feed(&mut state, &["AUTHENTICATE +"]);
    let expected = slirc_client::sasl::encode_plain("bot", "slircbot", "hunter2");
    assert_eq!(sent(&actions), vec![format!("AUTHENTICATE {}", expected)]);

    let actions = feed(&mut state, &[":srv 903 bot :SASL authentication successful"]);
    assert_eq!(sent(&actions), vec!["CAP END"]);

    let actions = feed(&mut state, &[":srv 904 bot :SASL authentication failed"]);
    assert_eq!(sent(&actions), vec!["CAP END"]);
    assert_eq!(kinds(&actions), vec![EventKind::Error]);

    let actions = feed(&mut state, &[":srv CAP * NAK :sasl"]);
    assert_eq!(sent(&actions), vec!["CAP END"]);
}

#[test]
fn invite_oper_pong_topic() {
    let mut state = in_channel();
    let actions = feed(
        &mut state,
        &[
            ":alice!a@h INVITE bot :#secret",
            ":srv 381 bot :You are now an IRC operator",
            ":srv PONG srv :1",
            ":alice!a@h TOPIC #test :new topic",
        ],
    );
    assert_eq!(
        events(&actions),
        vec![
            Event::Invite {
                channel: "#secret".into(),
                from: Some("alice".into()),
            },
            Event::Opered,
            Event::Pong { server: "srv".into() },
            Event::Topic {
                channel: "#test".into(),
                topic: "new topic".into(),
                nick: "alice".into(),
            },
        ]
    );
    let channel = state.channel("#test").unwrap();
    assert_eq!(channel.topic.as_deref(), Some("new topic"));
    assert_eq!(channel.topic_by.as_deref(), Some("alice"));
}

#[test]
fn welcome_resets_capabilities() {
    let mut state = in_channel();
    assert_eq!(state.capabilities().channel.modes.a, "beI");
    feed(&mut state, &[":srv 001 bot :Welcome bot!bot@h"]);
    assert_eq!(state.capabilities().channel.modes.a, "");
    assert_eq!(state.capabilities().nick_length, 9);
}

#[test]
fn kill_and_quit_leave_every_channel() {
    let mut state = in_channel();
    feed(
        &mut state,
        &[
            ":bot!b@h JOIN #two",
            ":bot!b@h JOIN #three",
            ":erin!e@h JOIN #test",
            ":erin!e@h JOIN #two",
            ":erin!e@h JOIN #three",
            ":alice!a@h JOIN #three",
        ],
    );

    let actions = feed(&mut state, &[":srv KILL erin :too noisy"]);
    assert_eq!(
        events(&actions),
        vec![Event::Kill {
            nick: "erin".into(),
            reason: Some("too noisy".into()),
            channels: vec!["#test".into(), "#two".into(), "#three".into()],
        }]
    );
    for name in ["#test", "#two", "#three"] {
        assert!(!state.channel(name).unwrap().users.contains_key("erin"));
    }

    let actions = feed(&mut state, &[":alice!a@h QUIT :gone"]);
    assert!(matches!(
        &events(&actions)[0],
        Event::Quit { channels, .. } if channels == &vec!["#test".to_string(), "#three".to_string()]
    ));
    for name in ["#test", "#two", "#three"] {
        assert!(!state.channel(name).unwrap().users.contains_key("alice"));
    }
}
