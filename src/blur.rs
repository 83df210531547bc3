//! Gaussian smoothing for single-channel opacity masks

use crate::config::MaskBlur;
use image::GrayImage;

/// Binomial kernels used when sigma is derived from the kernel size
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[
        0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
    ],
];

/// Sigma implied by a kernel size when none is given
#[must_use]
pub fn derived_sigma(kernel_size: u32) -> f32 {
    ((kernel_size as f32 - 1.0) * 0.5 - 1.0) * 0.3 + 0.8
}

/// Build a normalized 1-D Gaussian kernel of odd length `kernel_size`
#[must_use]
pub fn gaussian_kernel(kernel_size: u32, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 && kernel_size % 2 == 1 && kernel_size <= 7 {
        if let Some(table) = SMALL_KERNELS.get((kernel_size / 2) as usize) {
            return table.to_vec();
        }
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        derived_sigma(kernel_size)
    };
    let center = (kernel_size as f32 - 1.0) * 0.5;
    let scale = -0.5 / (sigma * sigma);

    let mut weights: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let x = i as f32 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Mirror an out-of-range index back into `0..len` without repeating the edge
/// sample (`dcb|abcd|cba`)
fn reflect_101(mut index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    loop {
        if index < 0 {
            index = -index;
        } else if index > last {
            index = 2 * last - index;
        } else {
            return index as usize;
        }
    }
}

/// Smooth a mask with a separable Gaussian
///
/// Returns an unchanged copy when blurring is disabled. Values are rounded
/// half-up after both passes.
#[must_use]
pub fn gaussian_blur_mask(mask: &GrayImage, blur: &MaskBlur) -> GrayImage {
    if !blur.is_enabled() || mask.width() == 0 || mask.height() == 0 {
        return mask.clone();
    }

    let kernel = gaussian_kernel(blur.kernel_size, blur.sigma);
    let radius = (kernel.len() / 2) as isize;
    let width = mask.width() as usize;
    let height = mask.height() as usize;
    let src = mask.as_raw();

    let mut horizontal = vec![0.0_f32; width * height];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as isize + k as isize - radius, width);
                acc += weight * f32::from(row[sx]);
            }
            horizontal[y * width + x] = acc;
        }
    }

    let mut out = vec![0_u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = reflect_101(y as isize + k as isize - radius, height);
                acc += weight * horizontal[sy * width + x];
            }
            out[y * width + x] = (acc + 0.5).floor().clamp(0.0, 255.0) as u8;
        }
    }

    GrayImage::from_raw(mask.width(), mask.height(), out)
        .unwrap_or_else(|| mask.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn blur3() -> MaskBlur {
        MaskBlur::default()
    }

    #[test]
    fn test_small_kernel_tables() {
        assert_eq!(gaussian_kernel(3, 0.0), vec![0.25, 0.5, 0.25]);
        assert_eq!(gaussian_kernel(1, 0.0), vec![1.0]);
        let k5 = gaussian_kernel(5, 0.0);
        assert_eq!(k5.len(), 5);
        assert!((k5.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_computed_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(9, 0.0);
        assert_eq!(kernel.len(), 9);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        for i in 0..4 {
            assert!((kernel[i] - kernel[8 - i]).abs() < 1e-6);
        }
        assert!(kernel[4] > kernel[3]);

        let explicit = gaussian_kernel(3, 2.0);
        assert!(explicit[1] < 0.5, "wider sigma flattens the kernel");
    }

    #[test]
    fn test_derived_sigma() {
        assert!((derived_sigma(3) - 0.8).abs() < 1e-6);
        assert!((derived_sigma(5) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
        assert_eq!(reflect_101(-3, 2), 1);
    }

    #[test]
    fn test_uniform_mask_is_unchanged() {
        let zeros = GrayImage::from_pixel(6, 4, Luma([0]));
        assert_eq!(gaussian_blur_mask(&zeros, &blur3()), zeros);

        let full = GrayImage::from_pixel(6, 4, Luma([255]));
        assert_eq!(gaussian_blur_mask(&full, &blur3()), full);
    }

    #[test]
    fn test_single_pixel_impulse_response() {
        let mut mask = GrayImage::new(5, 5);
        mask.put_pixel(2, 2, Luma([255]));

        let blurred = gaussian_blur_mask(&mask, &blur3());
        assert_eq!(blurred.get_pixel(2, 2)[0], 64);
        assert_eq!(blurred.get_pixel(1, 2)[0], 32);
        assert_eq!(blurred.get_pixel(2, 3)[0], 32);
        assert_eq!(blurred.get_pixel(1, 1)[0], 16);
        assert_eq!(blurred.get_pixel(3, 3)[0], 16);
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_edge_uses_reflection() {
        // Column 0 opaque: reflection at the left border sees column 1 twice
        let mut mask = GrayImage::new(4, 3);
        for y in 0..3 {
            mask.put_pixel(0, y, Luma([255]));
        }
        let blurred = gaussian_blur_mask(&mask, &blur3());
        // 0.25 * 0 + 0.5 * 255 + 0.25 * 0 = 127.5 -> 128
        assert_eq!(blurred.get_pixel(0, 1)[0], 128);
        assert_eq!(blurred.get_pixel(1, 1)[0], 64);
        assert_eq!(blurred.get_pixel(2, 1)[0], 0);
    }

    #[test]
    fn test_disabled_blur_is_identity() {
        let mut mask = GrayImage::new(3, 3);
        mask.put_pixel(1, 1, Luma([255]));
        assert_eq!(gaussian_blur_mask(&mask, &MaskBlur::disabled()), mask);
    }

    #[test]
    fn test_tiny_images() {
        let single = GrayImage::from_pixel(1, 1, Luma([255]));
        assert_eq!(gaussian_blur_mask(&single, &blur3()).get_pixel(0, 0)[0], 255);

        let empty = GrayImage::new(0, 0);
        assert_eq!(gaussian_blur_mask(&empty, &blur3()).dimensions(), (0, 0));
    }
}
