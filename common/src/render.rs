use crate::columns::Column;
use crate::job::Session;
use crate::sort::SortState;

pub const SORT_MARK_ASC: &str = " ▲";
pub const SORT_MARK_DESC: &str = " ▼";

/// Display content of one table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    /// Raised annotation, such as the GM marker after a character number.
    Sup(String),
    Span(Vec<Fragment>),
}

impl Fragment {
    pub fn text(s: impl Into<String>) -> Self {
        Fragment::Text(s.into())
    }

    /// Flattens to text, writing superscripts as `^X`.
    pub fn to_plain(&self) -> String {
        self.to_styled(false)
    }

    /// Flattens to text. With `superscript` set, raised annotations use
    /// Unicode modifier letters when every character has one.
    pub fn to_styled(&self, superscript: bool) -> String {
        let mut out = String::new();
        self.write_into(&mut out, superscript);
        out
    }

    fn write_into(&self, out: &mut String, superscript: bool) {
        match self {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Sup(text) => match superscript.then(|| to_superscript(text)).flatten() {
                Some(raised) => out.push_str(&raised),
                None => {
                    out.push('^');
                    out.push_str(text);
                }
            },
            Fragment::Span(parts) => {
                for part in parts {
                    part.write_into(out, superscript);
                }
            }
        }
    }
}

fn to_superscript(text: &str) -> Option<String> {
    text.chars()
        .map(|c| {
            Some(match c {
                'A' => 'ᴬ',
                'B' => 'ᴮ',
                'D' => 'ᴰ',
                'E' => 'ᴱ',
                'G' => 'ᴳ',
                'H' => 'ᴴ',
                'I' => 'ᴵ',
                'J' => 'ᴶ',
                'K' => 'ᴷ',
                'L' => 'ᴸ',
                'M' => 'ᴹ',
                'N' => 'ᴺ',
                'O' => 'ᴼ',
                'P' => 'ᴾ',
                'R' => 'ᴿ',
                'T' => 'ᵀ',
                'U' => 'ᵁ',
                'W' => 'ᵂ',
                _ => return None,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Fragment>>,
}

impl RenderedTable {
    pub fn plain_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(Fragment::to_plain).collect())
            .collect()
    }
}

pub fn build_header(columns: &[Column]) -> Vec<String> {
    columns.iter().map(|c| c.name.to_string()).collect()
}

/// Header labels with the direction mark on the active sort column.
pub fn header_with_marks(columns: &[Column], sort: &SortState) -> Vec<String> {
    columns
        .iter()
        .map(|c| {
            if c.name == sort.column {
                let mark = if sort.ascending { SORT_MARK_ASC } else { SORT_MARK_DESC };
                format!("{}{}", c.name, mark)
            } else {
                c.name.to_string()
            }
        })
        .collect()
}

/// Draws one row per session and one cell per column, in the order given.
/// Reads nothing but its arguments.
pub fn render_table<'a, I>(sessions: I, columns: &[Column]) -> RenderedTable
where
    I: IntoIterator<Item = &'a Session>,
{
    let rows = sessions
        .into_iter()
        .map(|session| columns.iter().map(|c| (c.render)(session)).collect())
        .collect();

    RenderedTable {
        header: build_header(columns),
        rows,
    }
}
