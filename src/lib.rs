#![warn(missing_debug_implementations)]

use std::mem::size_of;

use anyhow::ensure;
use bytemuck::bytes_of;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, Buffer, CommandEncoderDescriptor, ComputePassDescriptor, ComputePipeline,
    ComputePipelineDescriptor, Device, PipelineCompilationOptions, PipelineLayoutDescriptor,
    PushConstantRange, Queue, ShaderModuleDescriptor, ShaderSource, ShaderStages,
};

use crate::{
    param::PushConstants,
    stages::{effective_workgroup_size, stage_sequence},
};

pub mod param;
pub mod stages;

/// Sorts the contents of a storage buffer in place with a staged bitonic
/// network.
///
/// Each sort encodes one compute pass; every network stage is one dispatch of
/// the same pipeline, parameterized through push constants.
#[derive(Debug)]
pub struct BitonicSorter {
    bind_group_layout: BindGroupLayout,
    bind_group: BindGroup,

    pipeline: ComputePipeline,
    workgroup_size: u32,
}

impl BitonicSorter {
    /// `data_member_def` and `data_cmp_expr` are substituted into the shader
    /// source, e.g. `"key: u32, payload: u32,"` with `"a.key > b.key"`.
    pub fn new(
        device: &Device,
        target_buffer: &Buffer,
        data_member_def: &str,
        data_cmp_expr: &str,
    ) -> Self {
        let limits = device.limits();
        let max_threads = limits
            .max_compute_invocations_per_workgroup
            .min(limits.max_compute_workgroup_size_x);
        // power of two floor, the stage math relies on it
        let workgroup_size = 1 << max_threads.ilog2();

        let shader_src = include_str!("./bitonic_sort.wgsl");

        let shader_src = shader_src
            .replace("value: u32,", data_member_def)
            .replace("a.value > b.value", data_cmp_expr)
            .replace(
                "const WORKGROUP_SIZE: u32 = 256u;",
                &format!("const WORKGROUP_SIZE: u32 = {workgroup_size}u;"),
            );

        let shader = device.create_shader_module({
            ShaderModuleDescriptor {
                label: Some("./bitonic_sort.wgsl"),
                source: ShaderSource::Wgsl(shader_src.into()),
            }
        });

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("bitonic sort bind group layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = Self::create_bind_group(device, target_buffer, &bind_group_layout);

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("bitonic sort compute pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[PushConstantRange {
                stages: ShaderStages::COMPUTE,
                range: 0..size_of::<PushConstants>() as u32,
            }],
        });

        let pipeline = device.create_compute_pipeline(&ComputePipelineDescriptor {
            label: Some("bitonic sort compute pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("bitonic_sort_stage"),
            compilation_options: PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            bind_group_layout,
            bind_group,
            pipeline,
            workgroup_size,
        }
    }

    fn create_bind_group(
        device: &Device,
        target_buffer: &Buffer,
        layout: &BindGroupLayout,
    ) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("bitonic sort bind group"),
            layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: target_buffer.as_entire_binding(),
            }],
        })
    }

    pub fn change_buffer(&mut self, device: &Device, target_buffer: &Buffer) {
        self.bind_group = Self::create_bind_group(device, target_buffer, &self.bind_group_layout)
    }

    /// Sorts the first `data_len` entries of the bound buffer; entries past
    /// `data_len` are left untouched.
    ///
    /// `data_len` must be a power of two; one thread handles two entries, so
    /// inputs shorter than two workgroups sort in a single local dispatch.
    pub fn sort(&self, device: &Device, queue: &Queue, data_len: u32) -> anyhow::Result<()> {
        ensure!(
            data_len >= 2 && data_len.is_power_of_two(),
            "data length must be a power of two >= 2, got {data_len}"
        );

        let workgroup_size_x = effective_workgroup_size(data_len, self.workgroup_size);
        let workgroup_count = data_len / (workgroup_size_x * 2);

        let max_workgroups = device.limits().max_compute_workgroups_per_dimension;
        ensure!(
            workgroup_count <= max_workgroups,
            "{data_len} entries need {workgroup_count} workgroups, device limit is {max_workgroups}"
        );

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("bitonic sort command encoder"),
        });

        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("bitonic sort compute pass"),
                timestamp_writes: None,
            });

            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_pipeline(&self.pipeline);

            for stage in stage_sequence(data_len, workgroup_size_x) {
                pass.set_push_constants(0, bytes_of(&PushConstants { stage, data_len }));
                pass.dispatch_workgroups(workgroup_count, 1, 1);
            }
        }

        queue.submit([encoder.finish()]);

        Ok(())
    }
}
