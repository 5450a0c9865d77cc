// Copyright 2026 the Vitra authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end exercises of the modern backend behind the runtime
//! context. Tests skip themselves when no adapter is available.

use vitra_core::{
    ClearState, GraphicsBackend, LinearRgba, Mesh, PrimitiveTopology, RuntimeContext, ShaderKind,
    TextureDescriptor,
};
use vitra_infra::{HeadlessHost, WebGpuBackend};

fn context(width: u32, height: u32) -> Option<RuntimeContext> {
    let host = match HeadlessHost::new(width, height) {
        Ok(host) => host,
        Err(e) => {
            eprintln!("skipping WebGPU integration test (no adapter): {e}");
            return None;
        }
    };
    let mut ctx = RuntimeContext::new(Box::new(WebGpuBackend::new(Box::new(host))));
    assert!(ctx.backend_mut().init(width, height));
    Some(ctx)
}

#[test]
fn fan_mesh_draws_as_triangle_list() {
    let Some(mut ctx) = context(256, 256) else {
        return;
    };

    let mut fan = Mesh::new(PrimitiveTopology::TriangleFan);
    for i in 0..5 {
        let a = i as f32;
        fan.vertex(a * 0.1, a * 0.2, 0.0);
    }

    ctx.backend_mut().begin_frame();
    ctx.backend_mut().clear(&ClearState {
        color: LinearRgba::new(0.2, 0.4, 0.8, 1.0),
        ..ClearState::default()
    });
    ctx.draw_mesh(&fan);
    ctx.backend_mut().end_frame();

    let stats = ctx.backend().frame_stats();
    assert_eq!(stats.draw_calls, 1);
    // 5 fan vertices expand to 3 list triangles.
    assert_eq!(stats.triangles, 3);

    ctx.shutdown();
}

#[test]
fn texture_bind_then_draw_uses_textured_shader_path() {
    let Some(mut ctx) = context(128, 128) else {
        return;
    };

    let pixels: [u8; 16] = [
        255, 0, 0, 255, // red
        0, 255, 0, 255, // green
        0, 0, 255, 255, // blue
        255, 255, 255, 255, // white
    ];
    let texture = ctx
        .backend_mut()
        .create_texture(&TextureDescriptor::new_2d(2, 2), Some(&pixels));
    assert!(texture.is_valid());

    let mut quad = Mesh::new(PrimitiveTopology::TriangleStrip);
    quad.vertex(-1.0, -1.0, 0.0).texcoord(0.0, 1.0);
    quad.vertex(1.0, -1.0, 0.0).texcoord(1.0, 1.0);
    quad.vertex(-1.0, 1.0, 0.0).texcoord(0.0, 0.0);
    quad.vertex(1.0, 1.0, 0.0).texcoord(1.0, 0.0);

    ctx.backend_mut().begin_frame();
    ctx.backend_mut().set_texture("u_texture0", texture, 0);
    ctx.draw_mesh(&quad);
    ctx.backend_mut().end_frame();
    assert_eq!(ctx.backend().frame_stats().draw_calls, 1);

    ctx.backend_mut().destroy_texture(texture);
    ctx.shutdown();
}

#[test]
fn fbo_bridge_round_trip_with_real_target() {
    let Some(mut ctx) = context(64, 64) else {
        return;
    };

    let mut desc = TextureDescriptor::new_2d(512, 512);
    desc.render_target = true;
    let color = ctx.backend_mut().create_texture(&desc, None);
    let target = ctx.backend_mut().create_render_target(color, None);
    assert!(target.is_valid());

    ctx.fbo_bridge.register(42, target, 512, 512);
    assert_eq!(ctx.fbo_bridge.lookup_handle(42), target);
    assert_eq!(ctx.fbo_bridge.lookup_dimensions(42), (512, 512, true));
    assert!(!ctx.fbo_bridge.lookup_handle(0).is_valid());

    ctx.fbo_bridge.unregister(42);
    assert!(!ctx.fbo_bridge.lookup_handle(42).is_valid());

    ctx.backend_mut().destroy_render_target(target);
    ctx.backend_mut().destroy_texture(color);
    ctx.shutdown();
}

#[test]
fn default_shaders_are_cached_per_kind() {
    let Some(mut ctx) = context(64, 64) else {
        return;
    };
    let first = ctx.default_shader(ShaderKind::Mesh);
    let second = ctx.default_shader(ShaderKind::Mesh);
    assert!(first.is_valid());
    assert_eq!(first, second);

    let textured = ctx.default_shader(ShaderKind::Textured);
    assert!(textured.is_valid());
    assert_ne!(first, textured);
    ctx.shutdown();
}
