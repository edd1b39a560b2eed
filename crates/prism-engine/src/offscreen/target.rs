use crate::render::SharedTexture;

/// Edge length of the offscreen texture in pixels.
pub const OFFSCREEN_SIZE: u32 = 1024;

pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Opaque green, written once at creation and overwritten by the first render.
pub const SEED_COLOR: [u8; 4] = [0, 255, 0, 255];

/// Tightly packed RGBA8 seed contents.
pub fn seed_pixels() -> Vec<u8> {
    SEED_COLOR.repeat((OFFSCREEN_SIZE * OFFSCREEN_SIZE) as usize)
}

/// Creates the offscreen color target and fills it with `SEED_COLOR`.
///
/// Usable as a render attachment, as a sampled texture and as a copy source
/// for readback.
pub fn create_offscreen_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> SharedTexture {
    let texture = SharedTexture::new(
        device,
        "prism offscreen texture",
        (OFFSCREEN_SIZE, OFFSCREEN_SIZE),
        OFFSCREEN_FORMAT,
        wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST,
    );

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: texture.texture(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &seed_pixels(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * OFFSCREEN_SIZE),
            rows_per_image: Some(OFFSCREEN_SIZE),
        },
        wgpu::Extent3d {
            width: OFFSCREEN_SIZE,
            height: OFFSCREEN_SIZE,
            depth_or_array_layers: 1,
        },
    );

    log::info!(
        "offscreen texture #{} created: {OFFSCREEN_SIZE}x{OFFSCREEN_SIZE} {OFFSCREEN_FORMAT:?}",
        texture.id()
    );
    texture
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_opaque_green_everywhere() {
        let px = seed_pixels();
        assert_eq!(px.len(), (OFFSCREEN_SIZE * OFFSCREEN_SIZE * 4) as usize);
        assert!(px.chunks_exact(4).all(|p| p == SEED_COLOR));
    }
}
