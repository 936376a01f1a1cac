//! IRC numeric response codes and their symbolic names.
//!
//! This is the lookup table the parser uses to normalize a three-digit
//! numeric into a symbolic command name (`001` → `rpl_welcome`) and a
//! [`CommandType`] classification.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

mod helpers;

pub use self::helpers::ParseResponseError;

/// Classification of a parsed command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandType {
    /// A named command (`PRIVMSG`, `JOIN`, ...) or an unknown numeric.
    #[default]
    Normal,
    /// A known informational numeric.
    Reply,
    /// A known error numeric.
    Error,
}

macro_rules! responses {
    ($($(#[$meta:meta])* $variant:ident = $code:literal => $name:literal,)*) => {
        /// IRC server response code.
        ///
        /// Response codes are categorized as:
        /// - 001-099: Connection/registration
        /// - 200-399: Command replies
        /// - 400-599: Error replies
        /// - 600-999: Extended/modern numerics
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        #[non_exhaustive]
        pub enum Response {
            $($(#[$meta])* $variant = $code,)*
        }

        impl Response {
            /// Creates a Response from a numeric code.
            pub fn from_code(code: u16) -> Option<Response> {
                match code {
                    $($code => Some(Response::$variant),)*
                    _ => None,
                }
            }

            /// The lower-case symbolic name, e.g. `rpl_welcome`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Response::$variant => $name,)*
                }
            }
        }
    };
}

responses! {
    // === Connection Registration (001-099) ===
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1 => "rpl_welcome",
    /// 002 - Your host is running version
    RPL_YOURHOST = 2 => "rpl_yourhost",
    /// 003 - Server creation date
    RPL_CREATED = 3 => "rpl_created",
    /// 004 - Server info (name, version, user modes, channel modes)
    RPL_MYINFO = 4 => "rpl_myinfo",
    /// 005 - Server supported features (ISUPPORT)
    RPL_ISUPPORT = 5 => "rpl_isupport",
    /// 010 - Bounce to another server
    RPL_BOUNCE = 10 => "rpl_bounce",

    // === Command Responses (200-399) ===
    /// 221 - User mode string
    RPL_UMODEIS = 221 => "rpl_umodeis",
    /// 250 - Highest connection count
    RPL_STATSCONN = 250 => "rpl_statsconn",
    /// 251 - Luser client count
    RPL_LUSERCLIENT = 251 => "rpl_luserclient",
    /// 252 - Luser operator count
    RPL_LUSEROP = 252 => "rpl_luserop",
    /// 253 - Luser unknown connections
    RPL_LUSERUNKNOWN = 253 => "rpl_luserunknown",
    /// 254 - Luser channel count
    RPL_LUSERCHANNELS = 254 => "rpl_luserchannels",
    /// 255 - Luser local info
    RPL_LUSERME = 255 => "rpl_luserme",
    /// 256 - Admin info start
    RPL_ADMINME = 256 => "rpl_adminme",
    /// 257 - Admin location 1
    RPL_ADMINLOC1 = 257 => "rpl_adminloc1",
    /// 258 - Admin location 2
    RPL_ADMINLOC2 = 258 => "rpl_adminloc2",
    /// 259 - Admin email
    RPL_ADMINEMAIL = 259 => "rpl_adminemail",
    /// 263 - Try again later
    RPL_TRYAGAIN = 263 => "rpl_tryagain",
    /// 265 - Local users
    RPL_LOCALUSERS = 265 => "rpl_localusers",
    /// 266 - Global users
    RPL_GLOBALUSERS = 266 => "rpl_globalusers",
    /// 301 - User is away
    RPL_AWAY = 301 => "rpl_away",
    /// 302 - USERHOST reply
    RPL_USERHOST = 302 => "rpl_userhost",
    /// 303 - ISON reply
    RPL_ISON = 303 => "rpl_ison",
    /// 305 - You are no longer marked as away
    RPL_UNAWAY = 305 => "rpl_unaway",
    /// 306 - You have been marked as away
    RPL_NOWAWAY = 306 => "rpl_nowaway",
    /// 311 - WHOIS user info
    RPL_WHOISUSER = 311 => "rpl_whoisuser",
    /// 312 - WHOIS server info
    RPL_WHOISSERVER = 312 => "rpl_whoisserver",
    /// 313 - WHOIS operator status
    RPL_WHOISOPERATOR = 313 => "rpl_whoisoperator",
    /// 314 - WHOWAS user info
    RPL_WHOWASUSER = 314 => "rpl_whowasuser",
    /// 315 - End of WHO list
    RPL_ENDOFWHO = 315 => "rpl_endofwho",
    /// 317 - WHOIS idle time
    RPL_WHOISIDLE = 317 => "rpl_whoisidle",
    /// 318 - End of WHOIS
    RPL_ENDOFWHOIS = 318 => "rpl_endofwhois",
    /// 319 - WHOIS channels
    RPL_WHOISCHANNELS = 319 => "rpl_whoischannels",
    /// 321 - Channel list start
    RPL_LISTSTART = 321 => "rpl_liststart",
    /// 322 - Channel list entry
    RPL_LIST = 322 => "rpl_list",
    /// 323 - End of channel list
    RPL_LISTEND = 323 => "rpl_listend",
    /// 324 - Channel mode string
    RPL_CHANNELMODEIS = 324 => "rpl_channelmodeis",
    /// 329 - Channel creation time
    RPL_CREATIONTIME = 329 => "rpl_creationtime",
    /// 330 - WHOIS account name
    RPL_WHOISACCOUNT = 330 => "rpl_whoisaccount",
    /// 331 - No topic set
    RPL_NOTOPIC = 331 => "rpl_notopic",
    /// 332 - Channel topic
    RPL_TOPIC = 332 => "rpl_topic",
    /// 333 - Topic set by/time
    RPL_TOPICWHOTIME = 333 => "rpl_topicwhotime",
    /// 341 - Inviting user to channel
    RPL_INVITING = 341 => "rpl_inviting",
    /// 346 - Invite list entry
    RPL_INVITELIST = 346 => "rpl_invitelist",
    /// 347 - End of invite list
    RPL_ENDOFINVITELIST = 347 => "rpl_endofinvitelist",
    /// 348 - Exception list entry
    RPL_EXCEPTLIST = 348 => "rpl_exceptlist",
    /// 349 - End of exception list
    RPL_ENDOFEXCEPTLIST = 349 => "rpl_endofexceptlist",
    /// 351 - Server version
    RPL_VERSION = 351 => "rpl_version",
    /// 352 - WHO reply
    RPL_WHOREPLY = 352 => "rpl_whoreply",
    /// 353 - NAMES reply
    RPL_NAMREPLY = 353 => "rpl_namreply",
    /// 364 - Links entry
    RPL_LINKS = 364 => "rpl_links",
    /// 365 - End of links
    RPL_ENDOFLINKS = 365 => "rpl_endoflinks",
    /// 366 - End of NAMES
    RPL_ENDOFNAMES = 366 => "rpl_endofnames",
    /// 367 - Ban list entry
    RPL_BANLIST = 367 => "rpl_banlist",
    /// 368 - End of ban list
    RPL_ENDOFBANLIST = 368 => "rpl_endofbanlist",
    /// 369 - End of WHOWAS
    RPL_ENDOFWHOWAS = 369 => "rpl_endofwhowas",
    /// 371 - Info line
    RPL_INFO = 371 => "rpl_info",
    /// 372 - MOTD line
    RPL_MOTD = 372 => "rpl_motd",
    /// 374 - End of info
    RPL_ENDOFINFO = 374 => "rpl_endofinfo",
    /// 375 - MOTD start
    RPL_MOTDSTART = 375 => "rpl_motdstart",
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376 => "rpl_endofmotd",
    /// 381 - You are now an IRC operator
    RPL_YOUREOPER = 381 => "rpl_youreoper",
    /// 382 - Rehashing
    RPL_REHASHING = 382 => "rpl_rehashing",
    /// 391 - Server time
    RPL_TIME = 391 => "rpl_time",
    /// 396 - Displayed host changed
    RPL_HOSTHIDDEN = 396 => "rpl_hosthidden",

    // === Error Replies (400-599) ===
    /// 400 - Unknown error
    ERR_UNKNOWNERROR = 400 => "err_unknownerror",
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401 => "err_nosuchnick",
    /// 402 - No such server
    ERR_NOSUCHSERVER = 402 => "err_nosuchserver",
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403 => "err_nosuchchannel",
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404 => "err_cannotsendtochan",
    /// 405 - Too many channels
    ERR_TOOMANYCHANNELS = 405 => "err_toomanychannels",
    /// 406 - There was no such nickname
    ERR_WASNOSUCHNICK = 406 => "err_wasnosuchnick",
    /// 407 - Too many targets
    ERR_TOOMANYTARGETS = 407 => "err_toomanytargets",
    /// 409 - No origin specified
    ERR_NOORIGIN = 409 => "err_noorigin",
    /// 411 - No recipient given
    ERR_NORECIPIENT = 411 => "err_norecipient",
    /// 412 - No text to send
    ERR_NOTEXTTOSEND = 412 => "err_notexttosend",
    /// 417 - Input line too long
    ERR_INPUTTOOLONG = 417 => "err_inputtoolong",
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421 => "err_unknowncommand",
    /// 422 - MOTD file missing
    ERR_NOMOTD = 422 => "err_nomotd",
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431 => "err_nonicknamegiven",
    /// 432 - Erroneous nickname
    ERR_ERRONEUSNICKNAME = 432 => "err_erroneusnickname",
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433 => "err_nicknameinuse",
    /// 436 - Nickname collision
    ERR_NICKCOLLISION = 436 => "err_nickcollision",
    /// 437 - Resource temporarily unavailable
    ERR_UNAVAILRESOURCE = 437 => "err_unavailresource",
    /// 441 - User not in channel
    ERR_USERNOTINCHANNEL = 441 => "err_usernotinchannel",
    /// 442 - Not on channel
    ERR_NOTONCHANNEL = 442 => "err_notonchannel",
    /// 443 - User already on channel
    ERR_USERONCHANNEL = 443 => "err_useronchannel",
    /// 451 - Not registered
    ERR_NOTREGISTERED = 451 => "err_notregistered",
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461 => "err_needmoreparams",
    /// 462 - Already registered
    ERR_ALREADYREGISTRED = 462 => "err_alreadyregistred",
    /// 464 - Password mismatch
    ERR_PASSWDMISMATCH = 464 => "err_passwdmismatch",
    /// 465 - Banned from server
    ERR_YOUREBANNEDCREEP = 465 => "err_yourebannedcreep",
    /// 467 - Channel key already set
    ERR_KEYSET = 467 => "err_keyset",
    /// 471 - Channel is full
    ERR_CHANNELISFULL = 471 => "err_channelisfull",
    /// 472 - Unknown mode char
    ERR_UNKNOWNMODE = 472 => "err_unknownmode",
    /// 473 - Invite only channel
    ERR_INVITEONLYCHAN = 473 => "err_inviteonlychan",
    /// 474 - Banned from channel
    ERR_BANNEDFROMCHAN = 474 => "err_bannedfromchan",
    /// 475 - Bad channel key
    ERR_BADCHANNELKEY = 475 => "err_badchannelkey",
    /// 476 - Bad channel mask
    ERR_BADCHANMASK = 476 => "err_badchanmask",
    /// 477 - Channel doesn't support modes / needs registered nick
    ERR_NOCHANMODES = 477 => "err_nochanmodes",
    /// 478 - Ban list full
    ERR_BANLISTFULL = 478 => "err_banlistfull",
    /// 481 - Permission denied
    ERR_NOPRIVILEGES = 481 => "err_noprivileges",
    /// 482 - Channel operator privileges needed
    ERR_CHANOPRIVSNEEDED = 482 => "err_chanoprivsneeded",
    /// 483 - Cannot kill a server
    ERR_CANTKILLSERVER = 483 => "err_cantkillserver",
    /// 484 - Connection restricted
    ERR_RESTRICTED = 484 => "err_restricted",
    /// 491 - No O-lines for your host
    ERR_NOOPERHOST = 491 => "err_nooperhost",
    /// 501 - Unknown user mode flag
    ERR_UMODEUNKNOWNFLAG = 501 => "err_umodeunknownflag",
    /// 502 - Cannot change mode for other users
    ERR_USERSDONTMATCH = 502 => "err_usersdontmatch",

    // === Extended/Modern Numerics (600+) ===
    /// 671 - WHOIS secure connection
    RPL_WHOISSECURE = 671 => "rpl_whoissecure",

    // SASL (IRCv3)
    /// 900 - Logged in as account
    RPL_LOGGEDIN = 900 => "rpl_loggedin",
    /// 901 - Logged out
    RPL_LOGGEDOUT = 901 => "rpl_loggedout",
    /// 902 - Nick locked
    ERR_NICKLOCKED = 902 => "err_nicklocked",
    /// 903 - SASL authentication successful
    RPL_SASLSUCCESS = 903 => "rpl_saslsuccess",
    /// 904 - SASL authentication failed
    ERR_SASLFAIL = 904 => "err_saslfail",
    /// 905 - SASL message too long
    ERR_SASLTOOLONG = 905 => "err_sasltoolong",
    /// 906 - SASL authentication aborted
    ERR_SASLABORTED = 906 => "err_saslaborted",
    /// 907 - Already authenticated
    ERR_SASLALREADY = 907 => "err_saslalready",
    /// 908 - Available SASL mechanisms
    RPL_SASLMECHS = 908 => "rpl_saslmechs",
}

/// Look up a raw command token in the numeric table.
///
/// Returns the symbolic name and classification for known numerics, and
/// `None` for named commands and unknown numerics.
pub fn lookup(raw_command: &str) -> Option<(Response, CommandType)> {
    let response: Response = raw_command.parse().ok()?;
    Some((response, response.command_type()))
}
