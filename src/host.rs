//! Contract with the host engine
//!
//! The host owns sprites, physics bodies and text. The match controller only
//! tells it where things are, what to remove and what to display.

use glam::Vec2;

use crate::sim::{PlayerId, TargetId};

/// A body in the host's world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyHandle {
    Fork(PlayerId),
    Target(TargetId),
}

/// World mutations and display outputs issued by the controller
pub trait World {
    fn set_body_position(&mut self, body: BodyHandle, pos: Vec2);
    fn set_body_rotation(&mut self, body: BodyHandle, theta: f32);
    fn destroy_body(&mut self, body: BodyHandle);
    /// Static bodies were moved, rebuild any cached spatial index
    fn refresh_static_group(&mut self);
    fn render_score(&mut self, player: PlayerId, score: i32);
    fn render_message(&mut self, text: &str);
}

/// One recorded `World` call
#[derive(Debug, Clone, PartialEq)]
pub enum WorldCall {
    SetPosition(BodyHandle, Vec2),
    SetRotation(BodyHandle, f32),
    Destroy(BodyHandle),
    RefreshStatic,
    Score(PlayerId, i32),
    Message(String),
}

/// World that just remembers what it was told
#[derive(Debug, Clone, Default)]
pub struct RecordingWorld {
    pub calls: Vec<WorldCall>,
}

impl RecordingWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Most recent score shown for a player
    pub fn last_score(&self, player: PlayerId) -> Option<i32> {
        self.calls.iter().rev().find_map(|c| match c {
            WorldCall::Score(p, s) if *p == player => Some(*s),
            _ => None,
        })
    }

    pub fn last_message(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|c| match c {
            WorldCall::Message(m) => Some(m.as_str()),
            _ => None,
        })
    }

    pub fn destroyed(&self) -> Vec<BodyHandle> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                WorldCall::Destroy(b) => Some(*b),
                _ => None,
            })
            .collect()
    }
}

impl World for RecordingWorld {
    fn set_body_position(&mut self, body: BodyHandle, pos: Vec2) {
        self.calls.push(WorldCall::SetPosition(body, pos));
    }

    fn set_body_rotation(&mut self, body: BodyHandle, theta: f32) {
        self.calls.push(WorldCall::SetRotation(body, theta));
    }

    fn destroy_body(&mut self, body: BodyHandle) {
        self.calls.push(WorldCall::Destroy(body));
    }

    fn refresh_static_group(&mut self) {
        self.calls.push(WorldCall::RefreshStatic);
    }

    fn render_score(&mut self, player: PlayerId, score: i32) {
        self.calls.push(WorldCall::Score(player, score));
    }

    fn render_message(&mut self, text: &str) {
        self.calls.push(WorldCall::Message(text.to_string()));
    }
}
