use crate::ports::spotify::Track;

const ARTIST_SEPARATOR: &str = ",";

/// Normalized shape of a playback reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyCard {
    pub action_label: String,
    pub title: String,
    pub artist_line: String,
    pub cover_url: String,
}

impl ReplyCard {
    pub fn from_track(action_label: &str, track: &Track) -> Self {
        Self {
            action_label: action_label.to_string(),
            title: track.title.clone(),
            artist_line: track.artists.join(ARTIST_SEPARATOR),
            cover_url: track.cover_url.clone().unwrap_or_default(),
        }
    }
}

/// What a successful command answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Card(ReplyCard),
    Text(String),
}

impl Reply {
    pub fn render(&self) -> String {
        match self {
            Reply::Card(card) => format_card(card),
            Reply::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Success(Reply),
    Failure(String),
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::Success(_))
    }

    /// The body sent back to the chat: HTML or text for successes, the plain
    /// error message for failures.
    pub fn render(&self) -> String {
        match self {
            DispatchResult::Success(reply) => reply.render(),
            DispatchResult::Failure(message) => message.clone(),
        }
    }
}

/// Render a card as the HTML table chat clients display.
///
/// Output depends only on the card, byte for byte. A missing cover still
/// renders the image cell with an empty `src`.
pub fn format_card(card: &ReplyCard) -> String {
    format!(
        r#"<table style="min-width:200px border:none;">
  <tr>
    <th style="text-align:left;border:none;" colspan="2" ><strong>{action}</strong></th>
 </tr>
 <tr>
 <td width ="56"><img src="{cover}" alt="cover img" width="56" height="56" style="margin-right: 1em;border:none;"></td>
 <td style="margin-right: 35px;border:none;">
     <div>
       <span style="font-size:1.2em "><strong>{title}</strong></span><br/>
     <span style="font-size:0.9em">{artist}</span>
     </div>
   </td>

  </tr>

</table>"#,
        action = card.action_label,
        cover = card.cover_url,
        title = card.title,
        artist = card.artist_line,
    )
}
