use crate::foundation::core::{Canvas, Point};
use crate::script::ast::{
    AnimationCommand, Fade, FadeDirection, Program, SceneSpec, TimelineEvent, VideoSpec,
    VisualElement, VisualKind,
};
use crate::script::error::{Span, SyntaxError};
use crate::script::lexer::{Token, TokenKind, lex};

/// Parse a whole script. The first grammar mismatch aborts the parse.
#[tracing::instrument(skip(src), fields(len = src.len()))]
pub(crate) fn parse_program(src: &str) -> Result<Program, SyntaxError> {
    let tokens = lex(src)?;
    let mut p = Parser {
        src,
        tokens,
        pos: 0,
    };
    let program = p.parse_program()?;
    tracing::debug!(scenes = program.scenes.len(), "parsed script");
    Ok(program)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        // Eof is sticky.
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn error(&self, span: Span, message: impl Into<String>) -> SyntaxError {
        SyntaxError::at(self.src, span, message)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let t = self.peek();
        self.error(t.span, format!("expected {expected}, found {}", t.kind))
    }

    fn at_kind(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn at_keyword(&self, word: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(s) if s == word)
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.at_kind(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Span, SyntaxError> {
        if self.at_kind(kind) {
            Ok(self.bump().span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_keyword(&mut self, word: &str, expected: &str) -> Result<Span, SyntaxError> {
        if self.at_keyword(word) {
            Ok(self.bump().span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<(String, Span), SyntaxError> {
        match self.peek().kind.clone() {
            TokenKind::Ident(s) => Ok((s, self.bump().span)),
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_string(&mut self, expected: &str) -> Result<String, SyntaxError> {
        match self.peek().kind.clone() {
            TokenKind::Str(s) => {
                self.bump();
                Ok(s)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_number(&mut self, expected: &str) -> Result<(f64, Span), SyntaxError> {
        match self.peek().kind.clone() {
            TokenKind::Number { value, .. } => Ok((value, self.bump().span)),
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_integer(&mut self, expected: &str) -> Result<(u64, Span), SyntaxError> {
        match self.peek().kind.clone() {
            TokenKind::Number {
                value,
                integer: true,
            } => {
                let span = self.bump().span;
                if value > u64::MAX as f64 {
                    return Err(self.error(span, "integer literal is too large"));
                }
                Ok((value as u64, span))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_duration(&mut self, expected: &str) -> Result<(f64, Span), SyntaxError> {
        match self.peek().kind.clone() {
            TokenKind::Duration(secs) => Ok((secs, self.bump().span)),
            _ => Err(self.unexpected(expected)),
        }
    }

    /// A duration in a position that must not be negative.
    fn expect_non_negative_duration(
        &mut self,
        expected: &str,
        what: &str,
    ) -> Result<f64, SyntaxError> {
        let (secs, span) = self.expect_duration(expected)?;
        if secs < 0.0 {
            return Err(self.error(span, format!("{what} must not be negative")));
        }
        Ok(secs)
    }

    fn expect_colon_after(&mut self, name: &str) -> Result<(), SyntaxError> {
        self.expect(&TokenKind::Colon, &format!("`:` after `{name}`"))?;
        Ok(())
    }

    fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let video = self.parse_video()?;

        let mut scenes = Vec::new();
        while !self.at_kind(&TokenKind::Eof) {
            scenes.push(self.parse_scene()?);
        }
        if scenes.is_empty() {
            return Err(self.unexpected("at least one `scene` block"));
        }

        Ok(Program { video, scenes })
    }

    /// `video { dimensions: (W, H) }`
    fn parse_video(&mut self) -> Result<VideoSpec, SyntaxError> {
        self.expect_keyword("video", "`video` block before any scene")?;
        self.expect(&TokenKind::LBrace, "`{` to open the video block")?;

        let mut dimensions = None;
        loop {
            if self.at_kind(&TokenKind::RBrace) {
                break;
            }
            let (name, span) = self.expect_ident("video property or `}`")?;
            match name.as_str() {
                "dimensions" => {
                    self.expect_colon_after(&name)?;
                    dimensions = Some(self.parse_dimensions()?);
                }
                other => {
                    return Err(self.error(
                        span,
                        format!("unknown video property `{other}`; expected `dimensions`"),
                    ));
                }
            }
        }
        let close = self.expect(&TokenKind::RBrace, "`}` to close the video block")?;

        let Some(dimensions) = dimensions else {
            return Err(self.error(
                close,
                "video block is missing required property `dimensions`",
            ));
        };
        Ok(VideoSpec { dimensions })
    }

    fn parse_dimensions(&mut self) -> Result<Canvas, SyntaxError> {
        self.expect(&TokenKind::LParen, "`(` to start dimensions")?;
        let width = self.parse_pixel_size("width")?;
        self.expect(&TokenKind::Comma, "`,` between width and height")?;
        let height = self.parse_pixel_size("height")?;
        self.expect(&TokenKind::RParen, "`)` to close dimensions")?;
        Ok(Canvas { width, height })
    }

    fn parse_pixel_size(&mut self, what: &str) -> Result<u32, SyntaxError> {
        let (v, span) = self.expect_integer(&format!("integer {what} in pixels"))?;
        if v == 0 {
            return Err(self.error(span, format!("{what} must be > 0")));
        }
        u32::try_from(v).map_err(|_| self.error(span, format!("{what} is out of range")))
    }

    /// `scene "title" { property* }`
    fn parse_scene(&mut self) -> Result<SceneSpec, SyntaxError> {
        self.expect_keyword("scene", "`scene` block")?;
        let title = self.expect_string("quoted scene title")?;
        self.expect(&TokenKind::LBrace, "`{` to open the scene body")?;

        let mut props = Vec::new();
        while !self.at_kind(&TokenKind::RBrace) {
            props.push(self.parse_scene_prop()?);
        }
        let close = self.expect(&TokenKind::RBrace, "`}` to close the scene body")?;

        let builder = props
            .into_iter()
            .fold(SceneBuilder::default(), SceneBuilder::merge_last_write);
        builder.finish(title).map_err(|msg| self.error(close, msg))
    }

    fn parse_scene_prop(&mut self) -> Result<SceneProp, SyntaxError> {
        let (name, span) = self.expect_ident("scene property or `}`")?;
        match name.as_str() {
            "duration" => {
                self.expect_colon_after(&name)?;
                let secs =
                    self.expect_non_negative_duration("duration such as `5s`", "scene duration")?;
                Ok(SceneProp::Duration(secs))
            }
            "narration" => {
                self.expect_colon_after(&name)?;
                Ok(SceneProp::Narration(
                    self.expect_string("quoted narration text")?,
                ))
            }
            "visuals" => {
                self.expect_colon_after(&name)?;
                Ok(SceneProp::Visuals(self.parse_visuals()?))
            }
            "timeline" => {
                self.expect_colon_after(&name)?;
                Ok(SceneProp::Timeline(self.parse_timeline()?))
            }
            other => Err(self.error(
                span,
                format!(
                    "unknown scene property `{other}`; expected one of `duration`, `narration`, `visuals`, `timeline`"
                ),
            )),
        }
    }

    fn parse_visuals(&mut self) -> Result<Vec<VisualElement>, SyntaxError> {
        self.expect(&TokenKind::LBrace, "`{` to open the visuals block")?;
        let mut out = Vec::new();
        while !self.at_kind(&TokenKind::RBrace) {
            out.push(self.parse_element()?);
            self.consume(&TokenKind::Comma);
        }
        self.bump();
        Ok(out)
    }

    /// `text(id: "t", at: (0, 0), content: "hi")` or `circle(id: "c", at: (0, 0), radius: 50)`
    fn parse_element(&mut self) -> Result<VisualElement, SyntaxError> {
        let kind = match &self.peek().kind {
            TokenKind::Ident(s) if s == "text" => ElementKeyword::Text,
            TokenKind::Ident(s) if s == "circle" => ElementKeyword::Circle,
            _ => {
                return Err(self.unexpected("visual element (`text` or `circle`) or `}`"));
            }
        };
        self.bump();
        self.expect(
            &TokenKind::LParen,
            &format!("`(` after `{}`", kind.keyword()),
        )?;

        let mut args = Vec::new();
        while !self.at_kind(&TokenKind::RParen) {
            args.push(self.parse_element_arg(kind)?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RParen, "`,` or `)` in element arguments")?;

        let builder = args
            .into_iter()
            .fold(ElementBuilder::default(), ElementBuilder::merge_last_write);
        builder.finish(kind).map_err(|msg| self.error(close, msg))
    }

    fn parse_element_arg(&mut self, kind: ElementKeyword) -> Result<ElementArg, SyntaxError> {
        let (name, span) = self.expect_ident("argument name")?;
        let allowed = kind.arguments();
        if !allowed.contains(&name.as_str()) {
            let list = allowed
                .iter()
                .map(|a| format!("`{a}`"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(self.error(
                span,
                format!(
                    "unknown argument `{name}` for `{}`; expected one of {list}",
                    kind.keyword()
                ),
            ));
        }
        self.expect_colon_after(&name)?;

        match name.as_str() {
            "id" => Ok(ElementArg::Id(self.expect_string("quoted element id")?)),
            "content" => Ok(ElementArg::Content(
                self.expect_string("quoted text content")?,
            )),
            "at" => Ok(ElementArg::At(self.parse_point()?)),
            "radius" => {
                let (r, span) = self.expect_number("radius number")?;
                if r <= 0.0 {
                    return Err(self.error(span, "circle radius must be > 0"));
                }
                Ok(ElementArg::Radius(r))
            }
            _ => unreachable!("argument names are checked against the variant"),
        }
    }

    /// `(x, y)` in script space.
    fn parse_point(&mut self) -> Result<Point, SyntaxError> {
        self.expect(&TokenKind::LParen, "`(` to start a point")?;
        let (x, _) = self.expect_number("x coordinate")?;
        self.expect(&TokenKind::Comma, "`,` between coordinates")?;
        let (y, _) = self.expect_number("y coordinate")?;
        self.expect(&TokenKind::RParen, "`)` to close a point")?;
        Ok(Point::new(x, y))
    }

    fn parse_timeline(&mut self) -> Result<Vec<TimelineEvent>, SyntaxError> {
        self.expect(&TokenKind::LBrace, "`{` to open the timeline block")?;
        let mut out = Vec::new();
        while !self.at_kind(&TokenKind::RBrace) {
            out.push(self.parse_trigger()?);
            self.consume(&TokenKind::Comma);
        }
        self.bump();
        Ok(out)
    }

    /// `at 1.5s { command* }`
    fn parse_trigger(&mut self) -> Result<TimelineEvent, SyntaxError> {
        self.expect_keyword("at", "time trigger (`at <time>s { ... }`) or `}`")?;
        let time = self.expect_non_negative_duration("trigger time such as `1s`", "trigger time")?;
        self.expect(&TokenKind::LBrace, "`{` to open the trigger body")?;

        let mut commands = Vec::new();
        while !self.at_kind(&TokenKind::RBrace) {
            commands.push(self.parse_command()?);
            self.consume(&TokenKind::Comma);
        }
        self.bump();

        Ok(TimelineEvent { time, commands })
    }

    fn parse_command(&mut self) -> Result<AnimationCommand, SyntaxError> {
        if self.at_keyword("fade") {
            return Ok(AnimationCommand::Fade(self.parse_fade()?));
        }
        Err(self.unexpected("animation command (`fade`) or `}`"))
    }

    /// `fade("target", in|out, duration: 1s)`
    fn parse_fade(&mut self) -> Result<Fade, SyntaxError> {
        self.bump();
        self.expect(&TokenKind::LParen, "`(` after `fade`")?;
        let target = self.expect_string("quoted target element id")?;
        self.expect(&TokenKind::Comma, "`,` after the fade target")?;

        let direction = match &self.peek().kind {
            TokenKind::Ident(s) if s == "in" => FadeDirection::In,
            TokenKind::Ident(s) if s == "out" => FadeDirection::Out,
            _ => return Err(self.unexpected("fade direction `in` or `out`")),
        };
        self.bump();
        self.expect(&TokenKind::Comma, "`,` after the fade direction")?;

        self.expect_keyword("duration", "`duration` argument")?;
        self.expect_colon_after("duration")?;
        let duration =
            self.expect_non_negative_duration("fade duration such as `1s`", "fade duration")?;
        self.consume(&TokenKind::Comma);
        self.expect(&TokenKind::RParen, "`)` to close `fade`")?;

        Ok(Fade {
            target,
            direction,
            duration,
        })
    }
}

/// One parsed `name: value` fragment of a scene body.
#[derive(Debug, Clone, PartialEq)]
enum SceneProp {
    Duration(f64),
    Narration(String),
    Visuals(Vec<VisualElement>),
    Timeline(Vec<TimelineEvent>),
}

/// Accumulates scene properties; a repeated property replaces the earlier one.
#[derive(Debug, Default)]
struct SceneBuilder {
    duration: Option<f64>,
    narration: Option<String>,
    visuals: Option<Vec<VisualElement>>,
    timeline: Option<Vec<TimelineEvent>>,
}

impl SceneBuilder {
    fn merge_last_write(mut self, prop: SceneProp) -> Self {
        match prop {
            SceneProp::Duration(v) => self.duration = Some(v),
            SceneProp::Narration(v) => self.narration = Some(v),
            SceneProp::Visuals(v) => self.visuals = Some(v),
            SceneProp::Timeline(v) => self.timeline = Some(v),
        }
        self
    }

    fn finish(self, title: String) -> Result<SceneSpec, String> {
        let Some(duration) = self.duration else {
            return Err(format!(
                "scene \"{title}\" is missing required property `duration`"
            ));
        };
        Ok(SceneSpec {
            title,
            duration,
            narration: self.narration,
            visuals: self.visuals.unwrap_or_default(),
            timeline: self.timeline.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKeyword {
    Text,
    Circle,
}

impl ElementKeyword {
    fn keyword(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Circle => "circle",
        }
    }

    fn arguments(self) -> &'static [&'static str] {
        match self {
            Self::Text => &["id", "at", "content"],
            Self::Circle => &["id", "at", "radius"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ElementArg {
    Id(String),
    At(Point),
    Content(String),
    Radius(f64),
}

#[derive(Debug, Default)]
struct ElementBuilder {
    id: Option<String>,
    at: Option<Point>,
    content: Option<String>,
    radius: Option<f64>,
}

impl ElementBuilder {
    fn merge_last_write(mut self, arg: ElementArg) -> Self {
        match arg {
            ElementArg::Id(v) => self.id = Some(v),
            ElementArg::At(v) => self.at = Some(v),
            ElementArg::Content(v) => self.content = Some(v),
            ElementArg::Radius(v) => self.radius = Some(v),
        }
        self
    }

    fn finish(self, keyword: ElementKeyword) -> Result<VisualElement, String> {
        let missing = |arg: &str| {
            format!(
                "`{}` is missing required argument `{arg}`",
                keyword.keyword()
            )
        };
        let id = self.id.ok_or_else(|| missing("id"))?;
        let at = self.at.ok_or_else(|| missing("at"))?;
        let kind = match keyword {
            ElementKeyword::Text => VisualKind::Text {
                content: self.content.ok_or_else(|| missing("content"))?,
            },
            ElementKeyword::Circle => VisualKind::Circle {
                radius: self.radius.ok_or_else(|| missing("radius"))?,
            },
        };
        Ok(VisualElement { id, at, kind })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/parser.rs"]
mod tests;
