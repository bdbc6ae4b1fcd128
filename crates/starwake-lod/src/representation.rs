//! Mesh vs. sprite representation with a hysteresis band.

/// How a rendered cluster's stars are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// One drawable per star.
    Mesh,
    /// Camera-facing sprites in instanced batches.
    Sprite,
}

/// Pick the representation for a cluster `camera_distance` from the camera.
///
/// Without a current representation the plain threshold decides. Otherwise
/// the cluster switches only once it leaves the band
/// `sprite_distance ± hysteresis`.
pub fn choose_representation(
    current: Option<Representation>,
    camera_distance: f32,
    sprite_distance: f32,
    hysteresis: f32,
) -> Representation {
    match current {
        None if camera_distance < sprite_distance => Representation::Mesh,
        None => Representation::Sprite,
        Some(Representation::Mesh) if camera_distance > sprite_distance + hysteresis => {
            Representation::Sprite
        }
        Some(Representation::Sprite) if camera_distance < sprite_distance - hysteresis => {
            Representation::Mesh
        }
        Some(current) => current,
    }
}
